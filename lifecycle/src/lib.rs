/*!

The lifecycle engine: idempotent create/delete/adopt recipes that drive any
[`GcpResource`](cloudify_gcp::GcpResource) through the host orchestrator's
retry protocol. Recipes never block on the provider; long-running operations
are persisted into the instance's runtime properties and advanced by one
poll per invocation, with the host asked to re-invoke after a delay.

!*/

mod engine;
mod error;
mod relationships;
mod retry;
mod tracker;
mod verdict;

pub use engine::{
    create, delete, load_startup_script, mutate, record_mutation, resource_created, start_instance,
};
pub use error::{LifecycleError, LifecycleResult};
pub use relationships::{copy_capability, relationships_of, target_capability, Capability};
pub use retry::run;
pub use tracker::{track, ClientPoller, OperationPoller};
pub use verdict::{Verdict, DEFAULT_RETRY_DELAY};
