//! Authenticated service clients and the process-wide client cache.
//!
//! Building a client means minting credentials and a reqwest client, which
//! is cheap but not free, and token state is worth sharing across lifecycle
//! invocations in the same process. Clients are therefore memoized per
//! (service, version, scope set, account) and live until the process exits.

use crate::auth::{Credentials, Token};
use crate::config::GcpConfig;
use crate::error::{self, Error, Result};
use lazy_static::lazy_static;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The provider services this plugin talks to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Compute,
    Dns,
    PubSub,
    Iam,
    Logging,
    Monitoring,
    Container,
}

serde_plain::derive_display_from_serialize!(Service);
serde_plain::derive_fromstr_from_deserialize!(Service);

impl Service {
    pub fn default_version(&self) -> &'static str {
        match self {
            Service::Monitoring => "v3",
            Service::Logging => "v2",
            _ => "v1",
        }
    }

    pub fn base_url(&self, version: &str) -> String {
        match self {
            Service::Compute => format!("https://www.googleapis.com/compute/{}", version),
            Service::Dns => format!("https://www.googleapis.com/dns/{}", version),
            Service::PubSub => format!("https://pubsub.googleapis.com/{}", version),
            Service::Iam => format!("https://iam.googleapis.com/{}", version),
            Service::Logging => format!("https://logging.googleapis.com/{}", version),
            Service::Monitoring => format!("https://monitoring.googleapis.com/{}", version),
            Service::Container => format!("https://container.googleapis.com/{}", version),
        }
    }

    pub fn default_scopes(&self) -> Vec<String> {
        let scopes: &[&str] = match self {
            Service::Compute => &["https://www.googleapis.com/auth/compute"],
            Service::Dns => &["https://www.googleapis.com/auth/ndev.clouddns.readwrite"],
            Service::PubSub => &["https://www.googleapis.com/auth/pubsub"],
            _ => &["https://www.googleapis.com/auth/cloud-platform"],
        };
        scopes.iter().map(|s| s.to_string()).collect()
    }
}

/// An authenticated JSON client for one provider service.
#[derive(Debug)]
pub struct ServiceClient {
    pub service: Service,
    pub version: String,
    base: String,
    http: reqwest::Client,
    credentials: Credentials,
    token: tokio::sync::Mutex<Option<Token>>,
}

impl ServiceClient {
    fn new(service: Service, version: &str, credentials: Credentials) -> Self {
        Self {
            service,
            version: version.to_string(),
            base: service.base_url(version),
            http: reqwest::Client::new(),
            credentials,
            token: tokio::sync::Mutex::new(None),
        }
    }

    async fn bearer(&self) -> Result<String> {
        let mut slot = self.token.lock().await;
        let needs_refresh = match slot.as_ref() {
            Some(token) => token.expired(),
            None => true,
        };
        if needs_refresh {
            *slot = Some(self.credentials.fetch_token(&self.http).await?);
        }
        // The slot is always populated at this point.
        Ok(slot
            .as_ref()
            .map(|token| token.access_token.clone())
            .unwrap_or_default())
    }

    /// Issue one JSON request. `path` may be service-relative or a full URL
    /// (operation selfLinks come back absolute).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base, path)
        };
        let token = self.bearer().await?;

        let mut request = self.http.request(method.clone(), &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        log::debug!("{} {}", method, url);
        let response = request.send().await.context(error::TransportSnafu {
            method: method.to_string(),
            url: url.clone(),
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context(error::DecodeSnafu { url: url.clone() })?;
        let payload: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                method: method.to_string(),
                url,
                payload,
            });
        }
        Ok(payload)
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct CacheKey {
    service: Service,
    version: String,
    scopes: Vec<String>,
    client_email: String,
}

lazy_static! {
    static ref CLIENTS: Mutex<HashMap<CacheKey, Arc<ServiceClient>>> = Mutex::new(HashMap::new());
}

/// Fetch or lazily build the memoized client for `(service, version, scopes)`.
/// Pass an empty scope slice to use the service's default scopes.
pub fn client(
    config: &GcpConfig,
    service: Service,
    version: Option<&str>,
    scopes: &[String],
) -> Arc<ServiceClient> {
    let version = version.unwrap_or_else(|| service.default_version());
    let mut scopes: Vec<String> = if scopes.is_empty() {
        service.default_scopes()
    } else {
        scopes.to_vec()
    };
    scopes.sort();

    let key = CacheKey {
        service,
        version: version.to_string(),
        scopes: scopes.clone(),
        client_email: config.auth.client_email.clone(),
    };

    let mut cache = CLIENTS.lock().unwrap_or_else(|e| e.into_inner());
    cache
        .entry(key)
        .or_insert_with(|| {
            Arc::new(ServiceClient::new(
                service,
                version,
                Credentials::new(config.auth.clone(), scopes),
            ))
        })
        .clone()
}
