use std::error::Error;
use std::fmt::{Display, Formatter};

/// The error type lifecycle operations surface to the host. The host treats
/// `NonRecoverable` as a workflow failure and `Recoverable` as a hint that a
/// whole-operation retry (for example after refreshing credentials) may
/// succeed. Everything retryable-with-delay is expressed as a
/// [`Verdict::Retry`](crate::Verdict::Retry), never as an error.
#[derive(Debug)]
pub enum LifecycleError {
    NonRecoverable {
        context: String,
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },
    Recoverable {
        context: String,
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },
}

pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

impl LifecycleError {
    pub fn non_recoverable<S: Into<String>>(context: S) -> Self {
        Self::NonRecoverable {
            context: context.into(),
            source: None,
        }
    }

    pub fn non_recoverable_with_source<S, E>(context: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        Self::NonRecoverable {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    pub fn recoverable_with_source<S, E>(context: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        Self::Recoverable {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    pub fn context(&self) -> &str {
        match self {
            Self::NonRecoverable { context, .. } | Self::Recoverable { context, .. } => context,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable { .. })
    }

    fn inner(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            Self::NonRecoverable { source, .. } | Self::Recoverable { source, .. } => {
                source.as_ref().map(|some| some.as_ref())
            }
        }
    }
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NonRecoverable { .. } => "Non-recoverable",
            Self::Recoverable { .. } => "Recoverable",
        };
        write!(f, "{}: {}", label, self.context())?;
        if let Some(inner) = self.inner() {
            write!(f, ": {}", inner)?;
        }
        Ok(())
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner().map(|e| e as &(dyn Error + 'static))
    }
}
