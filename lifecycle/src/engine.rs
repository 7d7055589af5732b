//! The idempotent lifecycle recipes.
//!
//! Every recipe is written to be invoked repeatedly with the same runtime
//! properties until it returns [`Verdict::Complete`]: each invocation
//! inspects the persisted state, advances the world by at most one provider
//! call, records what it did, and hands control back. Re-invoking a recipe
//! whose goal state already holds is a no-op.

use crate::error::{LifecycleError, LifecycleResult};
use crate::tracker::{self, OperationPoller};
use crate::verdict::Verdict;
use cloudify_gcp::{naming, ErrorClass, GcpResource, OperationHandle};
use cloudify_model::{
    CloudifyContext, RuntimeProperties, KIND, NAME, OPERATION, PROP_USE_EXTERNAL_RESOURCE,
    RESOURCE_ID,
};
use serde_json::{json, Value};

/// Whether a previous invocation already brought the resource fully up:
/// identity recorded and no operation still in flight.
pub fn resource_created(runtime: &RuntimeProperties) -> bool {
    runtime.contains(RESOURCE_ID) && !runtime.contains(OPERATION)
}

/// Record the provider-side representation of `resource` into the runtime
/// properties, plus the reserved identity keys.
fn record_identity(runtime: &RuntimeProperties, resource: &dyn GcpResource, body: &Value) {
    if let Value::Object(map) = body {
        runtime.merge(map.clone());
    }
    runtime.set(RESOURCE_ID, json!(resource.name()));
    runtime.set(NAME, json!(resource.name()));
    runtime.set(KIND, json!(resource.kind()));
}

/// Route a provider error the recipe has no special handling for: transient
/// trouble becomes a host retry, credential trouble a recoverable error,
/// everything else is surfaced as non-recoverable.
fn escalate(action: &str, e: cloudify_gcp::Error) -> LifecycleResult<Verdict> {
    match e.class() {
        ErrorClass::Transient => Ok(Verdict::retry(format!("{}: {}", action, e))),
        ErrorClass::Auth => Err(LifecycleError::recoverable_with_source(
            action.to_string(),
            e,
        )),
        _ => Err(LifecycleError::non_recoverable_with_source(
            action.to_string(),
            e,
        )),
    }
}

fn persist_operation(
    runtime: &RuntimeProperties,
    handle: &OperationHandle,
) -> LifecycleResult<()> {
    let record = handle.to_record().map_err(|e| {
        LifecycleError::non_recoverable_with_source("Serializing operation record", e)
    })?;
    runtime.set(OPERATION, record);
    Ok(())
}

/// Re-read the resource and record its identity. Runs once the create (or
/// its operation) has finished.
async fn finalize_create(
    runtime: &RuntimeProperties,
    resource: &dyn GcpResource,
) -> LifecycleResult<Verdict> {
    let body = match resource.get().await {
        Ok(body) => body,
        // The provider may not serve reads of a just-created resource yet.
        Err(e) if e.class() == ErrorClass::Missing => {
            return Ok(Verdict::retry(format!(
                "{} '{}' is not readable yet",
                resource.kind(),
                resource.name()
            )));
        }
        Err(e) => return escalate("Reading back created resource", e),
    };
    record_identity(runtime, resource, &body);
    log::info!("Created {} '{}'", resource.kind(), resource.name());
    Ok(Verdict::Complete)
}

/// Bring `resource` into existence, or adopt it when the node declares
/// `use_external_resource`.
pub async fn create(
    ctx: &CloudifyContext,
    resource: &dyn GcpResource,
    poller: &dyn OperationPoller,
) -> LifecycleResult<Verdict> {
    let runtime = ctx.runtime();

    if resource_created(runtime) {
        return Ok(Verdict::Complete);
    }

    if let Some(record) = runtime.get(OPERATION) {
        return match tracker::track(runtime, poller).await? {
            Verdict::Complete => {
                let verdict = finalize_create(runtime, resource).await?;
                if let Verdict::Retry { .. } = verdict {
                    // Put the record back so the next invocation lands in
                    // the read-back path instead of reissuing the insert.
                    runtime.set(OPERATION, record);
                }
                Ok(verdict)
            }
            retry => Ok(retry),
        };
    }

    if ctx.node.bool_property(PROP_USE_EXTERNAL_RESOURCE) {
        return adopt(runtime, resource).await;
    }

    let response = match resource.create().await {
        Ok(response) => response,
        Err(e) => return escalate("Creating resource", e),
    };
    match OperationHandle::from_response(&response) {
        Some(handle) => {
            persist_operation(runtime, &handle)?;
            Ok(Verdict::retry(format!(
                "Create of {} '{}' accepted as operation '{}'",
                resource.kind(),
                resource.name(),
                handle.name
            )))
        }
        // Direct-value response: the mutation finished inside the call.
        None => {
            record_identity(runtime, resource, &response);
            log::info!("Created {} '{}'", resource.kind(), resource.name());
            Ok(Verdict::Complete)
        }
    }
}

/// Adopt an externally managed resource: verify it exists and record its
/// identity without mutating anything provider-side.
async fn adopt(
    runtime: &RuntimeProperties,
    resource: &dyn GcpResource,
) -> LifecycleResult<Verdict> {
    naming::validate_identity(resource.name())
        .map_err(|e| LifecycleError::non_recoverable_with_source("Adopting resource", e))?;
    let body = match resource.get().await {
        Ok(body) => body,
        Err(e) if e.class() == ErrorClass::Missing => {
            return Err(LifecycleError::non_recoverable_with_source(
                format!(
                    "Resource '{}' is declared external but does not exist",
                    resource.name()
                ),
                e,
            ));
        }
        Err(e) => return escalate("Reading external resource", e),
    };
    record_identity(runtime, resource, &body);
    log::info!("Adopted external {} '{}'", resource.kind(), resource.name());
    Ok(Verdict::Complete)
}

/// Take `resource` out of existence. Complete when the provider no longer
/// knows the resource, whether this recipe deleted it or it was already
/// gone. Runtime properties are cleared only on completion.
pub async fn delete(
    ctx: &CloudifyContext,
    resource: &dyn GcpResource,
    poller: &dyn OperationPoller,
) -> LifecycleResult<Verdict> {
    let runtime = ctx.runtime();

    if !runtime.contains(RESOURCE_ID) && !runtime.contains(OPERATION) {
        // Create never got far enough to make anything.
        return Ok(Verdict::Complete);
    }

    if ctx.node.bool_property(PROP_USE_EXTERNAL_RESOURCE) {
        // Adopted resources are never deleted, only forgotten.
        runtime.clear();
        return Ok(Verdict::Complete);
    }

    if runtime.contains(OPERATION) {
        return match tracker::track(runtime, poller).await? {
            Verdict::Complete => {
                runtime.clear();
                log::info!("Deleted {} '{}'", resource.kind(), resource.name());
                Ok(Verdict::Complete)
            }
            retry => Ok(retry),
        };
    }

    let response = match resource.delete().await {
        Ok(response) => response,
        Err(e) if e.class() == ErrorClass::Missing => {
            runtime.clear();
            return Ok(Verdict::Complete);
        }
        Err(e) if e.class() == ErrorClass::InUse => {
            // Dependents are still being torn down; state stays intact so
            // the next invocation retries the same delete.
            return Ok(Verdict::retry(format!(
                "{} '{}' is still in use: {}",
                resource.kind(),
                resource.name(),
                e
            )));
        }
        Err(e) => return escalate("Deleting resource", e),
    };
    match OperationHandle::from_response(&response) {
        Some(handle) => {
            persist_operation(runtime, &handle)?;
            Ok(Verdict::retry(format!(
                "Delete of {} '{}' accepted as operation '{}'",
                resource.kind(),
                resource.name(),
                handle.name
            )))
        }
        None => {
            runtime.clear();
            log::info!("Deleted {} '{}'", resource.kind(), resource.name());
            Ok(Verdict::Complete)
        }
    }
}

/// The dotted paths an instance's address shows up at, in preference order.
const NAT_IP_PATH: &str = "networkInterfaces.0.accessConfigs.0.natIP";
const NETWORK_IP_PATH: &str = "networkInterfaces.0.networkIP";

/// Finish bringing an instance up: wait for the provider to assign an
/// address, then publish it under the `ip` runtime property.
pub async fn start_instance(
    ctx: &CloudifyContext,
    resource: &dyn GcpResource,
) -> LifecycleResult<Verdict> {
    let runtime = ctx.runtime();

    let body = match resource.get().await {
        Ok(body) => body,
        // The instance may not be visible yet right after create returns.
        Err(e) if e.class() == ErrorClass::Missing => {
            return Ok(Verdict::retry(format!(
                "Instance '{}' is not visible yet",
                resource.name()
            )));
        }
        Err(e) => return escalate("Reading instance", e),
    };
    if let Value::Object(map) = &body {
        runtime.merge(map.clone());
    }

    let ip = runtime
        .get_path(NAT_IP_PATH)
        .or_else(|| runtime.get_path(NETWORK_IP_PATH));
    match ip {
        Some(ip) => {
            runtime.set(cloudify_model::IP, ip);
            log::info!("Instance '{}' is up", resource.name());
            Ok(Verdict::Complete)
        }
        None => Ok(Verdict::retry(format!(
            "Waiting for instance '{}' to be assigned an address",
            resource.name()
        ))),
    }
}

/// Load a blueprint-bundled startup script through the context's resource
/// loader, for feeding into
/// [`Instance::with_startup_script`](cloudify_gcp::compute::Instance::with_startup_script).
pub fn load_startup_script(ctx: &CloudifyContext, path: &str) -> LifecycleResult<String> {
    let resources = ctx.resources.as_ref().ok_or_else(|| {
        LifecycleError::non_recoverable(format!(
            "Startup script '{}' requested but no blueprint resource loader is installed",
            path
        ))
    })?;
    let bytes = resources.get_resource(path).map_err(|e| {
        LifecycleError::non_recoverable_with_source(format!("Loading startup script '{}'", path), e)
    })?;
    String::from_utf8(bytes).map_err(|e| {
        LifecycleError::non_recoverable_with_source(
            format!("Startup script '{}' is not UTF-8", path),
            e,
        )
    })
}

/// Classify an ancillary mutation's response: an operation-shaped response
/// is recorded for tracking on the next invocation, anything else means the
/// mutation already finished.
pub fn record_mutation(
    runtime: &RuntimeProperties,
    response: &Value,
    label: &str,
) -> LifecycleResult<Verdict> {
    match OperationHandle::from_response(response) {
        Some(handle) => {
            persist_operation(runtime, &handle)?;
            Ok(Verdict::retry(format!(
                "{} accepted as operation '{}'",
                label, handle.name
            )))
        }
        None => Ok(Verdict::Complete),
    }
}

/// Drive an ancillary mutation (instance stop, setTags, attachDisk, ...)
/// across invocations: track the recorded operation when one is in flight,
/// otherwise issue `mutation` and record what came back. A resource the
/// provider no longer knows leaves nothing to mutate, so `Missing` counts
/// as complete.
pub async fn mutate<F>(
    ctx: &CloudifyContext,
    poller: &dyn OperationPoller,
    label: &str,
    mutation: F,
) -> LifecycleResult<Verdict>
where
    F: std::future::Future<Output = cloudify_gcp::Result<Value>>,
{
    let runtime = ctx.runtime();
    if runtime.contains(OPERATION) {
        return tracker::track(runtime, poller).await;
    }
    let response = match mutation.await {
        Ok(response) => response,
        Err(e) if e.class() == ErrorClass::Missing => return Ok(Verdict::Complete),
        Err(e) => return escalate(label, e),
    };
    record_mutation(runtime, &response, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_means_identity_without_operation() {
        let runtime = RuntimeProperties::new();
        assert!(!resource_created(&runtime));
        runtime.set(RESOURCE_ID, json!("my-net-1"));
        assert!(resource_created(&runtime));
        runtime.set(OPERATION, json!({"name": "op-1"}));
        assert!(!resource_created(&runtime));
    }
}
