//! Pub/Sub resources. These answer with the resource body directly; there is
//! no long-running operation to track.

use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct Topic {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
}

impl Topic {
    pub fn new(config: GcpConfig, name: impl Into<String>) -> Self {
        Self {
            client: client(&config, Service::PubSub, None, &[]),
            config,
            name: name.into(),
        }
    }

    fn path(&self) -> String {
        format!("projects/{}/topics/{}", self.config.project, self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for Topic {
    fn kind(&self) -> &str {
        "pubsub#topic"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({})
    }

    async fn get(&self) -> Result<Value> {
        self.client.get(&self.path()).await
    }

    async fn create(&self) -> Result<Value> {
        self.client.put(&self.path(), &self.to_body()).await
    }

    async fn delete(&self) -> Result<Value> {
        self.client.delete(&self.path()).await
    }
}

pub struct Subscription {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    topic: String,
    ack_deadline_seconds: u32,
    push_endpoint: Option<String>,
}

impl Subscription {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        topic: impl Into<String>,
        ack_deadline_seconds: u32,
        push_endpoint: Option<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::PubSub, None, &[]),
            config,
            name: name.into(),
            topic: topic.into(),
            ack_deadline_seconds,
            push_endpoint,
        }
    }

    fn path(&self) -> String {
        format!(
            "projects/{}/subscriptions/{}",
            self.config.project, self.name
        )
    }
}

#[async_trait::async_trait]
impl GcpResource for Subscription {
    fn kind(&self) -> &str {
        "pubsub#subscription"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        let mut body = json!({
            "topic": format!("projects/{}/topics/{}", self.config.project, self.topic),
            "ackDeadlineSeconds": self.ack_deadline_seconds,
        });
        if let Some(endpoint) = &self.push_endpoint {
            body["pushConfig"] = json!({ "pushEndpoint": endpoint });
        }
        body
    }

    async fn get(&self) -> Result<Value> {
        self.client.get(&self.path()).await
    }

    async fn create(&self) -> Result<Value> {
        self.client.put(&self.path(), &self.to_body()).await
    }

    async fn delete(&self) -> Result<Value> {
        self.client.delete(&self.path()).await
    }
}
