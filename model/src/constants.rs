/// Helper macro to avoid retyping the interface prefix the host orchestrator
/// uses for lifecycle operation names. With no parameters this returns the
/// base prefix; with a string literal it appends `.literal`.
macro_rules! lifecycle {
    () => {
        "cloudify.interfaces.lifecycle"
    };
    ($s:literal) => {
        concat!(lifecycle!(), ".", $s)
    };
}

macro_rules! relationship_lifecycle {
    () => {
        "cloudify.interfaces.relationship_lifecycle"
    };
    ($s:literal) => {
        concat!(relationship_lifecycle!(), ".", $s)
    };
}

// Reserved runtime-property keys.
pub const RESOURCE_ID: &str = "resource_id";
pub const NAME: &str = "name";
pub const KIND: &str = "kind";
pub const OPERATION: &str = "_operation";
pub const SELF_LINK: &str = "selfLink";
pub const ZONE: &str = "zone";
pub const REGION: &str = "region";
pub const IP: &str = "ip";

// Node-property keys consumed by the engine.
pub const PROP_USE_EXTERNAL_RESOURCE: &str = "use_external_resource";
pub const PROP_RESOURCE_ID: &str = "resource_id";
pub const PROP_NAME: &str = "name";
pub const PROP_GCP_CONFIG: &str = "gcp_config";
pub const PROP_CLIENT_CONFIG: &str = "client_config";

// Lifecycle operation names.
pub const OP_CREATE: &str = lifecycle!("create");
pub const OP_CONFIGURE: &str = lifecycle!("configure");
pub const OP_START: &str = lifecycle!("start");
pub const OP_STOP: &str = lifecycle!("stop");
pub const OP_DELETE: &str = lifecycle!("delete");

// Relationship-hook operation names.
pub const OP_PRECONFIGURE_SOURCE: &str = relationship_lifecycle!("preconfigure");
pub const OP_POSTCONFIGURE_SOURCE: &str = relationship_lifecycle!("postconfigure");
pub const OP_ESTABLISH: &str = relationship_lifecycle!("establish");
pub const OP_UNLINK: &str = relationship_lifecycle!("unlink");
