use crate::client::{client, Service, ServiceClient};
use crate::compute::network_url;
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A subnetwork inside a custom-mode VPC network.
pub struct Subnetwork {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    network: String,
    ip_cidr_range: String,
    region: String,
}

impl Subnetwork {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        network: impl Into<String>,
        ip_cidr_range: impl Into<String>,
    ) -> Self {
        let region = config.region();
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            network: network.into(),
            ip_cidr_range: ip_cidr_range.into(),
            region,
        }
    }

    fn collection(&self) -> String {
        format!(
            "projects/{}/regions/{}/subnetworks",
            self.config.project, self.region
        )
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for Subnetwork {
    fn kind(&self) -> &str {
        "compute#subnetwork"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({
            "description": "Cloudify generated subnetwork",
            "name": self.name,
            "network": network_url(&self.config.project, &self.network),
            "ipCidrRange": self.ip_cidr_range,
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
