//! Container-engine resources. Cluster mutations return long-running
//! operations like compute does; those operations carry a `zone` field and a
//! `selfLink`, and the tracker polls the selfLink so they are resolved at
//! the container service rather than compute.

use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A container cluster.
pub struct Cluster {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    initial_node_count: u32,
}

impl Cluster {
    pub fn new(config: GcpConfig, name: impl Into<String>, initial_node_count: u32) -> Self {
        Self {
            client: client(&config, Service::Container, None, &[]),
            config,
            name: name.into(),
            initial_node_count,
        }
    }

    fn collection(&self) -> String {
        format!(
            "projects/{}/zones/{}/clusters",
            self.config.project, self.config.zone
        )
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for Cluster {
    fn kind(&self) -> &str {
        "container#cluster"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({
            "cluster": {
                "name": self.name,
                "description": "Cloudify generated cluster",
                "initialNodeCount": self.initial_node_count,
            },
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_body_is_nested() {
        let cluster = Cluster::new(
            GcpConfig {
                project: "p".to_string(),
                zone: "us-central1-b".to_string(),
                ..GcpConfig::default()
            },
            "kube-1",
            3,
        );
        assert_eq!(cluster.to_body()["cluster"]["initialNodeCount"], 3);
        assert_eq!(
            cluster.path(),
            "projects/p/zones/us-central1-b/clusters/kube-1"
        );
    }
}
