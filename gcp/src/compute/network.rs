use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A VPC network.
pub struct Network {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    auto_subnets: bool,
}

impl Network {
    pub fn new(config: GcpConfig, name: impl Into<String>, auto_subnets: bool) -> Self {
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            auto_subnets,
        }
    }

    fn path(&self) -> String {
        format!(
            "projects/{}/global/networks/{}",
            self.config.project, self.name
        )
    }
}

#[async_trait::async_trait]
impl GcpResource for Network {
    fn kind(&self) -> &str {
        "compute#network"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({
            "description": "Cloudify generated network",
            "name": self.name,
            "autoCreateSubnetworks": self.auto_subnets,
        })
    }

    async fn get(&self) -> Result<Value> {
        self.client.get(&self.path()).await
    }

    async fn create(&self) -> Result<Value> {
        let path = format!("projects/{}/global/networks", self.config.project);
        self.client.post(&path, &self.to_body()).await
    }

    async fn delete(&self) -> Result<Value> {
        self.client.delete(&self.path()).await
    }
}
