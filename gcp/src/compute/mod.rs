/*!

Compute-engine resource types. Each module is a thin request/response
translation layer over the shared [`GcpResource`](crate::resource::GcpResource)
contract; the lifecycle engine never sees anything type-specific.

!*/

mod address;
mod disk;
mod firewall;
mod forwarding_rule;
mod health_check;
mod instance;
mod network;
mod subnetwork;
mod target_proxy;

pub use address::Address;
pub use disk::Disk;
pub use firewall::{AllowedRule, Firewall};
pub use forwarding_rule::GlobalForwardingRule;
pub use health_check::{HealthCheck, HealthCheckType};
pub use instance::{ExternalIp, Instance, ACCESS_CONFIG_NAME, ACCESS_CONFIG_TYPE};
pub use network::Network;
pub use subnetwork::Subnetwork;
pub use target_proxy::{TargetProxy, TargetProxyType};

/// Relative URL of a network within its project, as request bodies expect.
pub(crate) fn network_url(project: &str, network: &str) -> String {
    format!("projects/{}/global/networks/{}", project, network)
}

/// Relative URL of a zone's machine type.
pub(crate) fn machine_type_url(project: &str, zone: &str, machine_type: &str) -> String {
    format!(
        "projects/{}/zones/{}/machineTypes/{}",
        project, zone, machine_type
    )
}
