//! Cloud DNS resources. DNS mutations answer with the resource body (zones)
//! or a change set (record sets), never a compute-style operation, so these
//! mutations are complete as soon as they return.

use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::{Error, Result};
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A managed DNS zone.
pub struct ManagedZone {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    dns_name: String,
}

impl ManagedZone {
    pub fn new(config: GcpConfig, name: impl Into<String>, dns_name: impl Into<String>) -> Self {
        Self {
            client: client(&config, Service::Dns, None, &[]),
            config,
            name: name.into(),
            dns_name: dns_name.into(),
        }
    }

    fn collection(&self) -> String {
        format!("projects/{}/managedZones", self.config.project)
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }
}

#[async_trait::async_trait]
impl GcpResource for ManagedZone {
    fn kind(&self) -> &str {
        "dns#managedZone"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({
            "description": "Cloudify generated managed zone",
            "name": self.name,
            "dnsName": self.dns_name,
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

/// A record set inside a managed zone, maintained through the zone's change
/// feed: creation posts an `additions` change, deletion posts a `deletions`
/// change mirroring the live record.
pub struct RecordSet {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    zone: String,
    name: String,
    record_type: String,
    ttl: u32,
    rrdatas: Vec<String>,
}

impl RecordSet {
    pub fn new(
        config: GcpConfig,
        zone: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: u32,
        rrdatas: Vec<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::Dns, None, &[]),
            config,
            zone: zone.into(),
            name: name.into(),
            record_type: record_type.into(),
            ttl,
            rrdatas,
        }
    }

    fn changes(&self) -> String {
        format!(
            "projects/{}/managedZones/{}/changes",
            self.config.project, self.zone
        )
    }

    fn rrsets(&self) -> String {
        format!(
            "projects/{}/managedZones/{}/rrsets?name={}&type={}",
            self.config.project, self.zone, self.name, self.record_type
        )
    }
}

#[async_trait::async_trait]
impl GcpResource for RecordSet {
    fn kind(&self) -> &str {
        "dns#resourceRecordSet"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({
            "name": self.name,
            "type": self.record_type,
            "ttl": self.ttl,
            "rrdatas": self.rrdatas,
        })
    }

    async fn get(&self) -> Result<Value> {
        let listing = self.client.get(&self.rrsets()).await?;
        let found = listing
            .get("rrsets")
            .and_then(Value::as_array)
            .and_then(|sets| sets.first())
            .cloned();
        match found {
            Some(record) => Ok(record),
            None => Err(Error::Api {
                status: 404,
                method: "GET".to_string(),
                url: self.rrsets(),
                payload: json!({"error": {"message": "record set not found"}}),
            }),
        }
    }

    async fn create(&self) -> Result<Value> {
        self.client
            .post(&self.changes(), &json!({ "additions": [self.to_body()] }))
            .await
    }

    async fn delete(&self) -> Result<Value> {
        // The deletion entry must match the live record exactly.
        let live = self.get().await?;
        self.client
            .post(&self.changes(), &json!({ "deletions": [live] }))
            .await
    }
}
