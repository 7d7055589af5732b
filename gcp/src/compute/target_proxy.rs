use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// What a target proxy forwards to. HTTP(S) proxies point at a URL map;
/// TCP/SSL proxies point at a backend service.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TargetProxyType {
    Http,
    Https,
    Tcp,
    Ssl,
}

impl TargetProxyType {
    fn collection(&self) -> &'static str {
        match self {
            TargetProxyType::Http => "targetHttpProxies",
            TargetProxyType::Https => "targetHttpsProxies",
            TargetProxyType::Tcp => "targetTcpProxies",
            TargetProxyType::Ssl => "targetSslProxies",
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            TargetProxyType::Http => "compute#targetHttpProxy",
            TargetProxyType::Https => "compute#targetHttpsProxy",
            TargetProxyType::Tcp => "compute#targetTcpProxy",
            TargetProxyType::Ssl => "compute#targetSslProxy",
        }
    }
}

/// A load-balancer target proxy; the hop a forwarding rule's `target` URL
/// points at.
pub struct TargetProxy {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    proxy_type: TargetProxyType,
    /// URL map for HTTP(S), backend service for TCP/SSL.
    target: String,
    ssl_certificates: Vec<String>,
}

impl TargetProxy {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        proxy_type: TargetProxyType,
        target: impl Into<String>,
        ssl_certificates: Vec<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            proxy_type,
            target: target.into(),
            ssl_certificates,
        }
    }

    fn collection(&self) -> String {
        format!(
            "projects/{}/global/{}",
            self.config.project,
            self.proxy_type.collection()
        )
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for TargetProxy {
    fn kind(&self) -> &str {
        self.proxy_type.kind()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        let mut body = json!({
            "description": "Cloudify generated target proxy",
            "name": self.name,
        });
        match self.proxy_type {
            TargetProxyType::Http | TargetProxyType::Https => {
                body["urlMap"] = json!(self.target);
            }
            TargetProxyType::Tcp | TargetProxyType::Ssl => {
                body["service"] = json!(self.target);
            }
        }
        if matches!(self.proxy_type, TargetProxyType::Https | TargetProxyType::Ssl) {
            body["sslCertificates"] = json!(self.ssl_certificates);
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
    fn https_proxies_carry_certificates_and_url_map() {
        let proxy = TargetProxy::new(
            GcpConfig {
                project: "p".to_string(),
                ..GcpConfig::default()
            },
            "proxy-1",
            TargetProxyType::Https,
            "projects/p/global/urlMaps/map-1",
            vec!["projects/p/global/sslCertificates/cert-1".to_string()],
        );
        assert_eq!(proxy.path(), "projects/p/global/targetHttpsProxies/proxy-1");
        let body = proxy.to_body();
        assert_eq!(body["urlMap"], "projects/p/global/urlMaps/map-1");
        assert_eq!(body["sslCertificates"][0], "projects/p/global/sslCertificates/cert-1");
    }

    #[test]
    fn tcp_proxies_point_at_a_service() {
        let proxy = TargetProxy::new(
            GcpConfig::default(),
            "proxy-2",
            TargetProxyType::Tcp,
            "projects/p/global/backendServices/svc-1",
            vec![],
        );
        let body = proxy.to_body();
        assert_eq!(body["service"], "projects/p/global/backendServices/svc-1");
        assert!(body.get("sslCertificates").is_none());
    }
}
