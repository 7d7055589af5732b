/*!

`cloudify-model` defines the contract between the host orchestrator and the
GCP lifecycle plugin. The host owns node-instance state; the plugin sees it
through the [`CloudifyContext`] object and mutates it through
[`RuntimeProperties`]. Nothing in this crate talks to the cloud provider.

!*/

mod constants;
mod context;
mod error;
mod resources;

pub use constants::*;
pub use context::{
    CloudifyContext, InstanceContext, NodeContext, OperationContext, Relationship, RelatedNode,
    RetryRequest, RuntimeProperties,
};
pub use error::{Error, Result};
pub use resources::{BlueprintResources, FileBlueprintResources};
