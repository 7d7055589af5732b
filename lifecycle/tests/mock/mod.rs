//! Scripted stand-ins for the provider so recipes can be driven through
//! multi-invocation scenarios without a network.

use async_trait::async_trait;
use cloudify_gcp::{Error, GcpResource, OperationHandle, Result};
use cloudify_lifecycle::OperationPoller;
use cloudify_model::{
    BlueprintResources, CloudifyContext, InstanceContext, NodeContext,
    PROP_USE_EXTERNAL_RESOURCE,
};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

/// A resource whose provider calls pop pre-scripted responses. Popping an
/// empty script panics, which doubles as an assertion that the recipe made
/// no call it was not supposed to.
pub struct MockResource {
    kind: &'static str,
    name: String,
    get_script: Mutex<VecDeque<Result<Value>>>,
    create_script: Mutex<VecDeque<Result<Value>>>,
    delete_script: Mutex<VecDeque<Result<Value>>>,
}

impl MockResource {
    pub fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            get_script: Mutex::new(VecDeque::new()),
            create_script: Mutex::new(VecDeque::new()),
            delete_script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn on_get(self, response: Result<Value>) -> Self {
        self.get_script.lock().unwrap().push_back(response);
        self
    }

    pub fn on_create(self, response: Result<Value>) -> Self {
        self.create_script.lock().unwrap().push_back(response);
        self
    }

    pub fn on_delete(self, response: Result<Value>) -> Self {
        self.delete_script.lock().unwrap().push_back(response);
        self
    }

    fn pop(script: &Mutex<VecDeque<Result<Value>>>, method: &str) -> Result<Value> {
        script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {} call", method))
    }
}

#[async_trait]
impl GcpResource for MockResource {
    fn kind(&self) -> &str {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_body(&self) -> Value {
        json!({ "name": self.name })
    }

    async fn get(&self) -> Result<Value> {
        Self::pop(&self.get_script, "get")
    }

    async fn create(&self) -> Result<Value> {
        Self::pop(&self.create_script, "create")
    }

    async fn delete(&self) -> Result<Value> {
        Self::pop(&self.delete_script, "delete")
    }
}

/// A poller whose polls pop pre-scripted refreshed handles.
pub struct MockPoller {
    script: Mutex<VecDeque<Result<OperationHandle>>>,
}

impl MockPoller {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn on_poll(self, response: Result<OperationHandle>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }
}

#[async_trait]
impl OperationPoller for MockPoller {
    async fn poll(&self, _handle: &OperationHandle) -> Result<OperationHandle> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected poll"))
    }
}

/// An in-memory blueprint archive. Requesting a path it does not hold
/// panics, marking a lookup the test did not script.
#[derive(Debug, Default)]
pub struct MemoryResources {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryResources {
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files
            .insert(path.to_string(), content.as_bytes().to_vec());
        self
    }
}

impl BlueprintResources for MemoryResources {
    fn download_resource(&self, path: &str) -> cloudify_model::Result<PathBuf> {
        Ok(PathBuf::from(path))
    }

    fn get_resource(&self, path: &str) -> cloudify_model::Result<Vec<u8>> {
        Ok(self
            .files
            .get(path)
            .unwrap_or_else(|| panic!("unexpected resource lookup '{}'", path))
            .clone())
    }
}

/// An `Error::Api` with the given status, as the wire layer would build it.
pub fn api_error(status: u16, payload: Value) -> Error {
    Error::Api {
        status,
        method: "GET".to_string(),
        url: "https://www.googleapis.com/compute/v1/projects/p/global/networks/n".to_string(),
        payload,
    }
}

/// An operation-shaped response at the given zone and status.
pub fn zone_operation(name: &str, status: &str) -> Value {
    json!({
        "kind": "compute#operation",
        "name": name,
        "status": status,
        "zone": "https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-b",
    })
}

pub fn handle(status: &str) -> OperationHandle {
    OperationHandle::from_response(&zone_operation("op-1", status))
        .expect("operation-shaped payload")
}

/// A context for one lifecycle invocation of one instance.
pub fn context(operation: &str, external: bool) -> CloudifyContext {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut properties = Map::new();
    if external {
        properties.insert(PROP_USE_EXTERNAL_RESOURCE.to_string(), json!(true));
    }
    let node = NodeContext {
        id: "network".to_string(),
        properties,
        type_hierarchy: vec![
            "cloudify.nodes.Root".to_string(),
            "cloudify.gcp.nodes.Network".to_string(),
        ],
    };
    let instance = InstanceContext {
        id: "network_abc123".to_string(),
        ..InstanceContext::default()
    };
    CloudifyContext::new(node, instance, operation)
}
