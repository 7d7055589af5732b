//! Cooperative tracking of in-flight provider operations.
//!
//! A mutation that returns an operation is not finished when the lifecycle
//! call returns. The handle is persisted under the `_operation` runtime
//! property and every subsequent invocation of the same lifecycle operation
//! issues exactly one poll, then either clears the record (done), surfaces
//! the operation's terminal error, or writes the refreshed record back and
//! asks the host to come back later. Nothing in this module ever sleeps.

use crate::error::{LifecycleError, LifecycleResult};
use crate::verdict::Verdict;
use async_trait::async_trait;
use cloudify_gcp::{Error as GcpError, ErrorClass, OperationHandle, ServiceClient};
use cloudify_model::{RuntimeProperties, OPERATION};
use std::sync::Arc;

/// One poll of an in-flight operation. The engine is written against this
/// trait so tracking can be driven without a live provider.
#[async_trait]
pub trait OperationPoller: Send + Sync {
    async fn poll(&self, handle: &OperationHandle) -> cloudify_gcp::Result<OperationHandle>;
}

/// The production poller: one `get` against the operation's own endpoint.
pub struct ClientPoller {
    client: Arc<ServiceClient>,
    project: String,
}

impl ClientPoller {
    pub fn new(client: Arc<ServiceClient>, project: impl Into<String>) -> Self {
        Self {
            client,
            project: project.into(),
        }
    }
}

#[async_trait]
impl OperationPoller for ClientPoller {
    async fn poll(&self, handle: &OperationHandle) -> cloudify_gcp::Result<OperationHandle> {
        handle.refresh(&self.client, &self.project).await
    }
}

/// Advance the operation recorded in `runtime` by one poll.
///
/// Returns `Complete` once the operation is done and the record has been
/// cleared, `Retry` while it is still in flight. A done-with-error operation
/// clears the record and surfaces the provider's error payload verbatim.
pub async fn track(
    runtime: &RuntimeProperties,
    poller: &dyn OperationPoller,
) -> LifecycleResult<Verdict> {
    let record = match runtime.get(OPERATION) {
        Some(record) => record,
        None => return Ok(Verdict::Complete),
    };
    let handle = OperationHandle::from_record(&record).map_err(|e| {
        // A record we cannot read will never resolve on its own.
        runtime.remove(OPERATION);
        LifecycleError::non_recoverable_with_source("Corrupt operation record", e)
    })?;

    let refreshed = match poller.poll(&handle).await {
        Ok(refreshed) => refreshed,
        Err(e) => {
            return match e.class() {
                // Leave the record in place; the next invocation polls again.
                ErrorClass::Transient => Ok(Verdict::retry(format!(
                    "Polling operation '{}' failed transiently: {}",
                    handle.name, e
                ))),
                ErrorClass::Auth => Err(LifecycleError::recoverable_with_source(
                    format!("Polling operation '{}'", handle.name),
                    e,
                )),
                _ => {
                    runtime.remove(OPERATION);
                    Err(LifecycleError::non_recoverable_with_source(
                        format!("Polling operation '{}'", handle.name),
                        e,
                    ))
                }
            };
        }
    };

    if !refreshed.is_done() {
        runtime.set(
            OPERATION,
            refreshed.to_record().map_err(|e| {
                LifecycleError::non_recoverable_with_source("Serializing operation record", e)
            })?,
        );
        return Ok(Verdict::retry(format!(
            "Operation '{}' is {}",
            refreshed.name, refreshed.status
        )));
    }

    runtime.remove(OPERATION);
    if let Some(failure) = refreshed.failure() {
        return Err(LifecycleError::non_recoverable_with_source(
            "Provider operation failed",
            GcpError::OperationFailed {
                name: refreshed.name.clone(),
                payload: failure.clone(),
            },
        ));
    }
    log::debug!("Operation '{}' is done", refreshed.name);
    Ok(Verdict::Complete)
}
