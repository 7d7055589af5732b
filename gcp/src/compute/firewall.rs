use crate::client::{client, Service, ServiceClient};
use crate::compute::network_url;
use crate::config::GcpConfig;
use crate::error::Result;
use crate::naming::canonicalize;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// One allowed-traffic entry of a firewall rule.
#[derive(Clone, Debug)]
pub struct AllowedRule {
    pub ip_protocol: String,
    pub ports: Vec<String>,
}

/// A firewall rule scoped to one network.
pub struct Firewall {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    network: String,
    allowed: Vec<AllowedRule>,
    source_ranges: Vec<String>,
    target_tags: Vec<String>,
}

impl Firewall {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        network: impl Into<String>,
        allowed: Vec<AllowedRule>,
        source_ranges: Vec<String>,
        target_tags: Vec<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            network: network.into(),
            allowed,
            source_ranges,
            target_tags,
        }
    }

    /// Firewall names must be unique per project, so rules that secure one
    /// network derive their name from the rule name plus the network.
    pub fn scoped_name(name: &str, network: &str) -> String {
        canonicalize(&format!("{}-{}", name, network))
    }

    fn path(&self) -> String {
        format!(
            "projects/{}/global/firewalls/{}",
            self.config.project, self.name
        )
    }
}

#[async_trait::async_trait]
impl GcpResource for Firewall {
    fn kind(&self) -> &str {
        "compute#firewall"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        let allowed: Vec<Value> = self
            .allowed
            .iter()
            .map(|rule| {
                if rule.ports.is_empty() {
                    json!({ "IPProtocol": rule.ip_protocol })
                } else {
                    json!({ "IPProtocol": rule.ip_protocol, "ports": rule.ports })
                }
            })
            .collect();
        let mut body = json!({
            "description": "Cloudify generated firewall rule",
            "name": self.name,
            "network": network_url(&self.config.project, &self.network),
            "allowed": allowed,
            "sourceRanges": self.source_ranges,
        });
        if !self.target_tags.is_empty() {
            body["targetTags"] = json!(self.target_tags);
        }
        body
    }

    async fn get(&self) -> Result<Value> {
        self.client.get(&self.path()).await
    }

    async fn create(&self) -> Result<Value> {
        let path = format!("projects/{}/global/firewalls", self.config.project);
        self.client.post(&path, &self.to_body()).await
    }

    async fn delete(&self) -> Result<Value> {
        self.client.delete(&self.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_name_is_canonical() {
        assert_eq!(
            Firewall::scoped_name("allow_ssh", "my_net"),
            "allow-ssh-my-net"
        );
    }

    #[test]
    fn ports_are_omitted_when_empty() {
        let firewall = Firewall::new(
            GcpConfig {
                project: "p".to_string(),
                ..GcpConfig::default()
            },
            "fw-1",
            "my-net-1",
            vec![
                AllowedRule {
                    ip_protocol: "tcp".to_string(),
                    ports: vec!["22".to_string()],
                },
                AllowedRule {
                    ip_protocol: "icmp".to_string(),
                    ports: vec![],
                },
            ],
            vec!["0.0.0.0/0".to_string()],
            vec![],
        );
        let body = firewall.to_body();
        assert_eq!(body["allowed"][0]["ports"][0], "22");
        assert!(body["allowed"][1].get("ports").is_none());
        assert!(body.get("targetTags").is_none());
    }
}
