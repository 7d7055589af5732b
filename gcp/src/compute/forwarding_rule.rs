use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A global forwarding rule: the public entry point of a load balancer,
/// wired to a target proxy via the `connected_to` relationship.
pub struct GlobalForwardingRule {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    /// Target-proxy URL, usually pulled from the relationship target's
    /// `selfLink` runtime property.
    target: String,
    port_range: String,
    ip_address: Option<String>,
}

impl GlobalForwardingRule {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        target: impl Into<String>,
        port_range: impl Into<String>,
        ip_address: Option<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            target: target.into(),
            port_range: port_range.into(),
            ip_address,
        }
    }

    fn collection(&self) -> String {
        format!("projects/{}/global/forwardingRules", self.config.project)
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }

    /// Point the rule at a different target proxy.
    pub async fn set_target(&self, target: &str) -> Result<Value> {
        self.client
            .post(
                &format!("{}/setTarget", self.path()),
                &json!({ "target": target }),
            )
            .await
    }
}

#[async_trait::async_trait]
impl GcpResource for GlobalForwardingRule {
    fn kind(&self) -> &str {
        "compute#forwardingRule"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        let mut body = json!({
            "description": "Cloudify generated global forwarding rule",
            "name": self.name,
            "target": self.target,
            "portRange": self.port_range,
        });
        if let Some(ip) = &self.ip_address {
            body["IPAddress"] = json!(ip);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_the_proxy_target() {
        let rule = GlobalForwardingRule::new(
            GcpConfig {
                project: "p".to_string(),
                ..GcpConfig::default()
            },
            "fr-1",
            "projects/p/global/targetHttpProxies/proxy-1",
            "80-80",
            None,
        );
        let body = rule.to_body();
        assert_eq!(body["target"], "projects/p/global/targetHttpProxies/proxy-1");
        assert_eq!(body["portRange"], "80-80");
        assert!(body.get("IPAddress").is_none());
    }
}
