use crate::client::{client, Service, ServiceClient};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

/// A zonal persistent disk.
pub struct Disk {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    image: Option<String>,
    size_gb: Option<u64>,
}

impl Disk {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        image: Option<String>,
        size_gb: Option<u64>,
    ) -> Self {
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            image,
            size_gb,
        }
    }

    fn collection(&self) -> String {
        format!(
            "projects/{}/zones/{}/disks",
            self.config.project, self.config.zone
        )
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }

    /// The structure an instance's `attachDisk` call expects for this disk.
    pub fn attachment(&self) -> Value {
        json!({
            "deviceName": self.name,
            "boot": false,
            "mode": "READ_WRITE",
            "autoDelete": false,
            "source": format!(
                "projects/{}/zones/{}/disks/{}",
                self.config.project, self.config.zone, self.name
            ),
        })
    }
}

#[async_trait::async_trait]
impl GcpResource for Disk {
    fn kind(&self) -> &str {
        "compute#disk"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        let mut body = json!({
            "description": "Cloudify generated disk",
            "name": self.name,
        });
        if let Some(size) = self.size_gb {
            body["sizeGb"] = json!(size.to_string());
        }
        body
    }

    async fn get(&self) -> Result<Value> {
        self.client.get(&self.path()).await
    }

    async fn create(&self) -> Result<Value> {
        let mut path = self.collection();
        // The source image rides in the query string, not the body.
        if let Some(image) = &self.image {
            path = format!("{}?sourceImage={}", path, image);
        }
        self.client.post(&path, &self.to_body()).await
    }

    async fn delete(&self) -> Result<Value> {
        self.client.delete(&self.path()).await
    }
}
