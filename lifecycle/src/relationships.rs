//! Capability extraction across relationship edges.
//!
//! A source node frequently needs a value its target only publishes once the
//! target's own create has finished, e.g. a static address's IP or a
//! network's selfLink. The value is read from the target's runtime
//! properties by dotted path; a missing value is not an error, it means the
//! target is not ready yet and the source should be re-invoked later.

use crate::verdict::Verdict;
use cloudify_model::{CloudifyContext, Relationship, KIND};
use serde_json::Value;

/// What a capability lookup produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Capability {
    Ready(Value),
    NotReady { message: String },
}

impl Capability {
    /// Fold into the engine's verdict shape: a not-ready capability becomes
    /// a host retry.
    pub fn into_verdict(self) -> Result<Value, Verdict> {
        match self {
            Capability::Ready(value) => Ok(value),
            Capability::NotReady { message } => Err(Verdict::retry(message)),
        }
    }
}

/// The instance's relationship edges, optionally filtered by relationship
/// type and by the provider kind the target has recorded.
pub fn relationships_of<'a>(
    ctx: &'a CloudifyContext,
    of_type: Option<&str>,
    of_kind: Option<&str>,
) -> Vec<&'a Relationship> {
    ctx.instance
        .relationships
        .iter()
        .filter(|edge| match of_type {
            Some(wanted) => edge.relationship_type == wanted,
            None => true,
        })
        .filter(|edge| match of_kind {
            Some(wanted) => edge
                .target_runtime
                .get_str(KIND)
                .map(|kind| kind == wanted)
                .unwrap_or(false),
            None => true,
        })
        .collect()
}

/// Copy a capability value from the target side of `edge` into the source
/// instance's runtime properties under `dest_key`. The relationship-hook
/// building block: `Complete` once copied, a host retry while the target has
/// not published the value yet.
pub fn copy_capability(
    ctx: &CloudifyContext,
    edge: &Relationship,
    path: &str,
    dest_key: &str,
) -> Verdict {
    match target_capability(edge, path) {
        Capability::Ready(value) => {
            ctx.runtime().set(dest_key, value);
            Verdict::Complete
        }
        Capability::NotReady { message } => Verdict::retry(message),
    }
}

/// Read a capability value from the target side of `edge` by dotted path.
pub fn target_capability(edge: &Relationship, path: &str) -> Capability {
    match edge.target_runtime.get_path(path) {
        Some(value) => Capability::Ready(value),
        None => Capability::NotReady {
            message: format!(
                "Waiting for '{}' of target '{}'",
                path, edge.target_id
            ),
        },
    }
}
