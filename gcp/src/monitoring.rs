//! Cloud Monitoring resources.

use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A monitoring group: a dynamic set of resources matched by filter.
pub struct Group {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    filter: String,
}

impl Group {
    pub fn new(config: GcpConfig, name: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            client: client(&config, Service::Monitoring, None, &[]),
            config,
            name: name.into(),
            filter: filter.into(),
        }
    }

    fn collection(&self) -> String {
        format!("projects/{}/groups", self.config.project)
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for Group {
    fn kind(&self) -> &str {
        "monitoring#group"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({
            "displayName": self.name,
            "filter": self.filter,
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
    fn group_body_carries_the_filter() {
        let group = Group::new(
            GcpConfig {
                project: "p".to_string(),
                ..GcpConfig::default()
            },
            "web-servers",
            "resource.metadata.tag.\"web\"",
        );
        assert_eq!(group.collection(), "projects/p/groups");
        assert_eq!(group.to_body()["displayName"], "web-servers");
    }
}
