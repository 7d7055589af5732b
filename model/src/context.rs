use crate::resources::BlueprintResources;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// The mutable per-instance state the host persists between lifecycle
/// invocations. Values written here must be observable by the host after the
/// lifecycle call returns, so the map carries a dirty flag.
///
/// The host scheduler guarantees a single writer per instance; the lock only
/// exists so relationship edges can hold read views of their target's state.
#[derive(Clone, Debug, Default)]
pub struct RuntimeProperties {
    inner: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    values: Map<String, Value>,
    dirty: bool,
}

impl RuntimeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(State {
                values,
                dirty: false,
            })),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().values.get(key).cloned()
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.read().values.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().values.contains_key(key)
    }

    /// Follow a dotted / indexed trail into the map, e.g.
    /// `networkInterfaces.0.accessConfigs.0.natIP`. Returns `None` when any
    /// intermediate segment is missing.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let state = self.read();
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = state.values.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current.clone())
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        let mut state = self.write();
        state.values.insert(key.into(), value);
        state.dirty = true;
    }

    /// Copy every entry of `map` into the runtime properties, overwriting
    /// existing keys.
    pub fn merge(&self, map: Map<String, Value>) {
        if map.is_empty() {
            return;
        }
        let mut state = self.write();
        for (key, value) in map {
            state.values.insert(key, value);
        }
        state.dirty = true;
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.write();
        let removed = state.values.remove(key);
        if removed.is_some() {
            state.dirty = true;
        }
        removed
    }

    /// Drop every runtime property. Used when a delete completes.
    pub fn clear(&self) {
        let mut state = self.write();
        if !state.values.is_empty() {
            state.values.clear();
            state.dirty = true;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read().values.is_empty()
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.read().values.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.read().dirty
    }

    /// Returns the dirty flag and resets it. The host calls this after a
    /// lifecycle invocation to decide whether state must be persisted.
    pub fn take_dirty(&self) -> bool {
        let mut state = self.write();
        std::mem::take(&mut state.dirty)
    }
}

/// The immutable node definition as the blueprint declared it.
#[derive(Clone, Debug, Default)]
pub struct NodeContext {
    pub id: String,
    pub properties: Map<String, Value>,
    pub type_hierarchy: Vec<String>,
}

impl NodeContext {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn bool_property(&self, key: &str) -> bool {
        self.properties
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_hierarchy.iter().any(|t| t == type_name)
    }
}

/// A read view of the node on the far side of a relationship edge.
#[derive(Clone, Debug, Default)]
pub struct RelatedNode {
    pub type_hierarchy: Vec<String>,
    pub properties: Map<String, Value>,
}

/// A resolved edge between two node instances. The target's runtime
/// properties are shared with the target's own context so capability data
/// written there is visible from the source side.
#[derive(Clone, Debug)]
pub struct Relationship {
    pub relationship_type: String,
    pub target_node: RelatedNode,
    pub target_id: String,
    pub target_runtime: RuntimeProperties,
}

/// The per-instance context: identity, persisted state, resolved edges.
#[derive(Clone, Debug, Default)]
pub struct InstanceContext {
    pub id: String,
    pub runtime_properties: RuntimeProperties,
    pub relationships: Vec<Relationship>,
}

/// A request that the host re-invoke the current lifecycle operation after
/// `delay`. This is the plugin's only suspension mechanism.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryRequest {
    pub message: String,
    pub delay: Duration,
}

/// The currently executing lifecycle operation, e.g.
/// `cloudify.interfaces.lifecycle.delete`, plus the retry-request slot the
/// host inspects after the call returns.
#[derive(Debug, Default)]
pub struct OperationContext {
    pub name: String,
    retry: Mutex<Option<RetryRequest>>,
}

impl OperationContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retry: Mutex::new(None),
        }
    }

    /// Ask the host to retry the current operation later.
    pub fn retry(&self, message: impl Into<String>, delay: Duration) {
        let mut slot = self.retry.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(RetryRequest {
            message: message.into(),
            delay,
        });
    }

    /// Whether a retry has been requested during this invocation.
    pub fn retry_requested(&self) -> bool {
        self.retry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Consume the pending retry request, if any. The host calls this once
    /// per invocation.
    pub fn take_retry(&self) -> Option<RetryRequest> {
        self.retry.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

/// Everything the plugin sees of the host orchestrator for one lifecycle
/// invocation of one node instance.
#[derive(Debug, Default)]
pub struct CloudifyContext {
    pub node: NodeContext,
    pub instance: InstanceContext,
    pub operation: OperationContext,
    pub resources: Option<Arc<dyn BlueprintResources>>,
}

impl CloudifyContext {
    pub fn new(node: NodeContext, instance: InstanceContext, operation_name: &str) -> Self {
        Self {
            node,
            instance,
            operation: OperationContext::new(operation_name),
            resources: None,
        }
    }

    pub fn with_resources(mut self, resources: Arc<dyn BlueprintResources>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn runtime(&self) -> &RuntimeProperties {
        &self.instance.runtime_properties
    }
}
