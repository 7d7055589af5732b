use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A reserved static external IP address. The allocated address shows up in
/// the resource body's `address` field once the reservation completes; bound
/// instances pull it from there.
pub struct Address {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    region: String,
}

impl Address {
    pub fn new(config: GcpConfig, name: impl Into<String>) -> Self {
        let region = config.region();
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            region,
        }
    }

    fn collection(&self) -> String {
        format!(
            "projects/{}/regions/{}/addresses",
            self.config.project, self.region
        )
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for Address {
    fn kind(&self) -> &str {
        "compute#address"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({
            "description": "Cloudify generated static IP address",
            "name": self.name,
        })
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
