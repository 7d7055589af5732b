use std::time::Duration;

/// How long the host is asked to wait before re-invoking an operation that
/// could not finish yet. Matches the orchestrator's own default retry
/// interval for cloud operations.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// The outcome of one invocation of a lifecycle operation. Operations never
/// block waiting for the cloud; when work remains they hand control back to
/// the host with `Retry` and a delay hint, and the host re-invokes the
/// operation later with the same runtime properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The operation reached its goal state, nothing left to do.
    Complete,
    /// The operation is in flight or blocked on something that should clear
    /// on its own. The host should re-invoke after `delay`.
    Retry { message: String, delay: Duration },
}

impl Verdict {
    pub fn retry<S: Into<String>>(message: S) -> Self {
        Self::Retry {
            message: message.into(),
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn retry_after<S: Into<String>>(message: S, delay: Duration) -> Self {
        Self::Retry {
            message: message.into(),
            delay,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}
