//! IAM resources. Custom roles answer with the role body directly.

use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A project-level custom role.
pub struct Role {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    title: String,
    permissions: Vec<String>,
}

impl Role {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        title: impl Into<String>,
        permissions: Vec<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::Iam, None, &[]),
            config,
            name: name.into(),
            title: title.into(),
            permissions,
        }
    }

    fn collection(&self) -> String {
        format!("projects/{}/roles", self.config.project)
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for Role {
    fn kind(&self) -> &str {
        "iam#role"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({
            "roleId": self.name,
            "role": {
                "title": self.title,
                "description": "Cloudify generated role",
                "includedPermissions": self.permissions,
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
    fn role_body_nests_the_definition() {
        let role = Role::new(
            GcpConfig {
                project: "p".to_string(),
                ..GcpConfig::default()
            },
            "deployer",
            "Deployer",
            vec!["compute.instances.create".to_string()],
        );
        let body = role.to_body();
        assert_eq!(body["roleId"], "deployer");
        assert_eq!(body["role"]["includedPermissions"][0], "compute.instances.create");
        assert_eq!(role.path(), "projects/p/roles/deployer");
    }
}
