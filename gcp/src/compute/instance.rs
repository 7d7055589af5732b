use crate::client::{client, Service, ServiceClient};
use crate::compute::{machine_type_url, network_url};
use crate::config::GcpConfig;
use crate::error::Result;
use crate::resource::GcpResource;
use serde_json::{json, Value};
use std::sync::Arc;

pub const ACCESS_CONFIG_TYPE: &str = "ONE_TO_ONE_NAT";
pub const ACCESS_CONFIG_NAME: &str = "External NAT";

/// How an instance's primary network interface reaches the outside world.
#[derive(Clone, Debug)]
pub enum ExternalIp {
    /// Let the provider hand out an ephemeral NAT address.
    Ephemeral,
    /// Bind a previously reserved static address.
    Static(String),
}

impl ExternalIp {
    fn access_config(&self) -> Value {
        match self {
            ExternalIp::Ephemeral => json!({
                "type": ACCESS_CONFIG_TYPE,
                "name": ACCESS_CONFIG_NAME,
            }),
            ExternalIp::Static(address) => json!({
                "type": ACCESS_CONFIG_TYPE,
                "name": ACCESS_CONFIG_NAME,
                "natIP": address,
            }),
        }
    }
}

/// A compute VM instance. Beyond the uniform contract this type carries the
/// extras the engine's `start`/`stop` recipes and relationship hooks use:
/// `start`, `stop`, `set_tags`, `add_access_config`, `attach_disk`.
pub struct Instance {
    client: Arc<ServiceClient>,
    config: GcpConfig,
    name: String,
    machine_type: String,
    image: String,
    subnetwork: Option<String>,
    external_ip: Option<ExternalIp>,
    tags: Vec<String>,
    startup_script: Option<String>,
    extra_disks: Vec<Value>,
}

impl Instance {
    pub fn new(
        config: GcpConfig,
        name: impl Into<String>,
        machine_type: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            client: client(&config, Service::Compute, None, &[]),
            config,
            name: name.into(),
            machine_type: machine_type.into(),
            image: image.into(),
            subnetwork: None,
            external_ip: None,
            tags: Vec::new(),
            startup_script: None,
            extra_disks: Vec::new(),
        }
    }

    pub fn with_subnetwork(mut self, subnetwork: impl Into<String>) -> Self {
        self.subnetwork = Some(subnetwork.into());
        self
    }

    pub fn with_external_ip(mut self, external_ip: ExternalIp) -> Self {
        self.external_ip = Some(external_ip);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_startup_script(mut self, script: impl Into<String>) -> Self {
        self.startup_script = Some(script.into());
        self
    }

    pub fn with_extra_disk(mut self, attachment: Value) -> Self {
        self.extra_disks.push(attachment);
        self
    }

    fn collection(&self) -> String {
        format!(
            "projects/{}/zones/{}/instances",
            self.config.project, self.config.zone
        )
    }

    fn path(&self) -> String {
        format!("{}/{}", self.collection(), self.name)
    }

    /// Boot the instance.
    pub async fn start(&self) -> Result<Value> {
        self.client
            .post(&format!("{}/start", self.path()), &json!({}))
            .await
    }

    /// Shut the instance down without deleting it.
    pub async fn stop(&self) -> Result<Value> {
        self.client
            .post(&format!("{}/stop", self.path()), &json!({}))
            .await
    }

    /// Replace the instance's network tags. `fingerprint` must be the value
    /// from the live instance body or the provider rejects the write.
    pub async fn set_tags(&self, tags: &[String], fingerprint: &str) -> Result<Value> {
        self.client
            .post(
                &format!("{}/setTags", self.path()),
                &json!({ "items": tags, "fingerprint": fingerprint }),
            )
            .await
    }

    /// Attach an external NAT address to a running instance's interface.
    pub async fn add_access_config(&self, interface: &str, nat_ip: &str) -> Result<Value> {
        self.client
            .post(
                &format!(
                    "{}/addAccessConfig?networkInterface={}",
                    self.path(),
                    interface
                ),
                &json!({
                    "type": ACCESS_CONFIG_TYPE,
                    "name": ACCESS_CONFIG_NAME,
                    "natIP": nat_ip,
                }),
            )
            .await
    }

    /// Attach a persistent disk (see [`Disk::attachment`](super::Disk::attachment)).
    pub async fn attach_disk(&self, attachment: &Value) -> Result<Value> {
        self.client
            .post(&format!("{}/attachDisk", self.path()), attachment)
            .await
    }

}

#[async_trait::async_trait]
impl GcpResource for Instance {
    fn kind(&self) -> &str {
        "compute#instance"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        let mut network_interface = match &self.subnetwork {
            Some(subnetwork) => json!({
                "subnetwork": format!(
                    "projects/{}/regions/{}/subnetworks/{}",
                    self.config.project,
                    self.config.region(),
                    subnetwork
                ),
            }),
            None => json!({
                "network": network_url(&self.config.project, &self.config.network),
            }),
        };
        if let Some(external_ip) = &self.external_ip {
            network_interface["accessConfigs"] = json!([external_ip.access_config()]);
        }

        let mut disks = vec![json!({
            "boot": true,
            "autoDelete": true,
            "initializeParams": { "sourceImage": self.image },
        })];
        disks.extend(self.extra_disks.iter().cloned());

        let mut body = json!({
            "description": "Cloudify generated instance",
            "name": self.name,
            "machineType": machine_type_url(
                &self.config.project,
                &self.config.zone,
                &self.machine_type
            ),
            "disks": disks,
            "networkInterfaces": [network_interface],
        });
        if !self.tags.is_empty() {
            body["tags"] = json!({ "items": self.tags });
        }
        if let Some(script) = &self.startup_script {
            body["metadata"] = json!({
                "items": [{ "key": "startup-script", "value": script }],
            });
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
            zone: "us-central1-b".to_string(),
            network: "default".to_string(),
            ..GcpConfig::default()
        }
    }

    #[test]
    fn static_ip_shapes_the_access_config() {
        let instance = Instance::new(config(), "vm-1", "n1-standard-1", "family/debian-12")
            .with_external_ip(ExternalIp::Static("203.0.113.10".to_string()));
        let body = instance.to_body();
        assert_eq!(
            body["networkInterfaces"][0]["accessConfigs"],
            json!([{
                "type": "ONE_TO_ONE_NAT",
                "name": "External NAT",
                "natIP": "203.0.113.10",
            }])
        );
    }

    #[test]
    fn no_external_ip_means_no_access_configs() {
        let instance = Instance::new(config(), "vm-1", "n1-standard-1", "family/debian-12");
        let body = instance.to_body();
        assert!(body["networkInterfaces"][0].get("accessConfigs").is_none());
        assert_eq!(
            body["networkInterfaces"][0]["network"],
            "projects/p/global/networks/default"
        );
    }

    #[test]
    fn machine_type_is_a_zone_url_and_boot_disk_first() {
        let instance = Instance::new(config(), "vm-1", "n1-standard-1", "family/debian-12")
            .with_tags(vec!["web".to_string()])
            .with_startup_script("#!/bin/sh\necho hi");
        let body = instance.to_body();
        assert_eq!(
            body["machineType"],
            "projects/p/zones/us-central1-b/machineTypes/n1-standard-1"
        );
        assert_eq!(body["disks"][0]["boot"], true);
        assert_eq!(body["tags"]["items"][0], "web");
        assert_eq!(body["metadata"]["items"][0]["key"], "startup-script");
    }
}
