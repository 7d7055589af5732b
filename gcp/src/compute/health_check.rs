use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// The protocol a health check probes with. HTTP and HTTPS use the legacy
/// per-protocol collections; TCP and SSL use the unified collection with a
/// `type` discriminator in the body.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HealthCheckType {
    Http,
    Https,
    Tcp,
    Ssl,
}

impl HealthCheckType {
    fn collection(&self) -> &'static str {
        match self {
            HealthCheckType::Http => "httpHealthChecks",
            HealthCheckType::Https => "httpsHealthChecks",
            HealthCheckType::Tcp | HealthCheckType::Ssl => "healthChecks",
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            HealthCheckType::Http => "compute#httpHealthCheck",
            HealthCheckType::Https => "compute#httpsHealthCheck",
            HealthCheckType::Tcp | HealthCheckType::Ssl => "compute#healthCheck",
        }
    }
}

/// A load-balancer health check of any of the four probe protocols.
pub struct HealthCheck {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    check_type: HealthCheckType,
    port: Option<u16>,
    request_path: Option<String>,
}

impl HealthCheck {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        check_type: HealthCheckType,
        port: Option<u16>,
        request_path: Option<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            check_type,
            port,
            request_path,
        }
    }

    fn collection(&self) -> String {
        format!(
            "projects/{}/global/{}",
            self.config.project,
            self.check_type.collection()
        )
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for HealthCheck {
    fn kind(&self) -> &str {
        self.check_type.kind()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        let mut body = json!({
            "description": "Cloudify generated health check",
            "name": self.name,
        });
        match self.check_type {
            HealthCheckType::Http | HealthCheckType::Https => {
                if let Some(port) = self.port {
                    body["port"] = json!(port);
                }
                if let Some(path) = &self.request_path {
                    body["requestPath"] = json!(path);
                }
            }
            HealthCheckType::Tcp => {
                body["type"] = json!("TCP");
                body["tcpHealthCheck"] = json!({ "port": self.port.unwrap_or(80) });
            }
            HealthCheckType::Ssl => {
                body["type"] = json!("SSL");
                body["sslHealthCheck"] = json!({ "port": self.port.unwrap_or(443) });
            }
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

    fn config() -> GcpConfig {
        GcpConfig {
            project: "p".to_string(),
            ..GcpConfig::default()
        }
    }

    #[test]
    fn http_checks_use_the_legacy_collection() {
        let check = HealthCheck::new(
            config(),
            "hc-1",
            HealthCheckType::Http,
            Some(8080),
            Some("/healthz".to_string()),
        );
        assert_eq!(check.path(), "projects/p/global/httpHealthChecks/hc-1");
        let body = check.to_body();
        assert_eq!(body["port"], 8080);
        assert_eq!(body["requestPath"], "/healthz");
        assert!(body.get("type").is_none());
    }

    #[test]
    fn tcp_checks_carry_a_type_discriminator() {
        let check = HealthCheck::new(config(), "hc-2", HealthCheckType::Tcp, Some(6379), None);
        assert_eq!(check.path(), "projects/p/global/healthChecks/hc-2");
        let body = check.to_body();
        assert_eq!(body["type"], "TCP");
        assert_eq!(body["tcpHealthCheck"]["port"], 6379);
    }
}
