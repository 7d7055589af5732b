//! Cloud Logging resources.

use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// Where a log sink hangs in the resource hierarchy. Project sinks use the
/// configured project; the other parents carry their own id.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SinkParent {
    BillingAccount(String),
    Folder(String),
    Organization(String),
    Project,
}

impl SinkParent {
    fn prefix(&self, project: &str) -> String {
        match self {
            SinkParent::BillingAccount(id) => format!("billingAccounts/{}", id),
            SinkParent::Folder(id) => format!("folders/{}", id),
            SinkParent::Organization(id) => format!("organizations/{}", id),
            SinkParent::Project => format!("projects/{}", project),
        }
    }
}

/// A log sink routing entries to a destination (storage bucket, pubsub
/// topic, BigQuery dataset).
pub struct Sink {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    parent: SinkParent,
    destination: String,
    filter: Option<String>,
}

impl Sink {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        parent: SinkParent,
        destination: impl Into<String>,
        filter: Option<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::Logging, None, &[]),
            config,
            name: name.into(),
            parent,
            destination: destination.into(),
            filter,
        }
    }

    fn collection(&self) -> String {
        format!("{}/sinks", self.parent.prefix(&self.config.project))
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for Sink {
    fn kind(&self) -> &str {
        "logging#sink"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "destination": self.destination,
        });
        if let Some(filter) = &self.filter {
            body["filter"] = json!(filter);
        }
        body
    }

    async fn get(&self) -> Result<Value> {
        self.client.get(&self.path()).await
    }

    async fn create(&self) -> Result<Value> {
        self.client.post(&self.collection(), &self.to_body()).await
    }

    async fn delete(&self) -> Result<Value> {
        self.client.delete(&self.path()).await
    }
}
