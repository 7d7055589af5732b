use serde_json::Value;
use snafu::Snafu;

/// How the engine should react to a provider failure. Every [`Error`] maps to
/// exactly one class; the lifecycle recipes route each class to its recovery
/// path (retry, adopt-failure, host retry, or non-recoverable surfacing).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// The resource does not exist (HTTP 404).
    Missing,

    /// The resource is referenced by something still alive (the provider
    /// reports these conflicts as HTTP 400 on the relevant endpoints).
    InUse,

    /// Connectivity, quota, or rate trouble. Worth retrying after a delay.
    Transient,

    /// Credentials were rejected or could not be minted.
    Auth,

    /// Everything else. Not retryable.
    Fatal,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to send {} request to '{}': {}", method, url, source))]
    Transport {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    #[snafu(display("Provider returned {} for {} '{}': {}", status, method, url, payload))]
    Api {
        status: u16,
        method: String,
        url: String,
        payload: Value,
    },

    #[snafu(display("Failed to decode response from '{}': {}", url, source))]
    Decode { url: String, source: reqwest::Error },

    #[snafu(display("Unable to sign service-account assertion: {}", source))]
    JwtSign {
        source: jsonwebtoken::errors::Error,
    },

    #[snafu(display("Token endpoint '{}' rejected the assertion ({}): {}", url, status, body))]
    TokenExchange {
        url: String,
        status: u16,
        body: String,
    },

    #[snafu(display("Failed to reach token endpoint '{}': {}", url, source))]
    TokenRequest { url: String, source: reqwest::Error },

    #[snafu(display(
        "Invalid resource name '{}': provider names must match '{}' (canonical form would be '{}')",
        name,
        rule,
        canonical
    ))]
    InvalidName {
        name: String,
        rule: String,
        canonical: String,
    },

    #[snafu(display("No client_config given and no config file at '{}'", path))]
    MissingConfig { path: String },

    #[snafu(display("Unable to read config file '{}': {}", path, source))]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("Unable to parse config file '{}': {}", path, source))]
    ConfigParse {
        path: String,
        source: serde_yaml::Error,
    },

    #[snafu(display("Unable to parse service-account credentials: {}", source))]
    CredentialsParse { source: serde_json::Error },

    #[snafu(display("Service-account credentials are missing required field '{}'", field))]
    CredentialsField { field: String },

    #[snafu(display("Operation '{}' finished with an error: {}", name, payload))]
    OperationFailed { name: String, payload: Value },

    #[snafu(display("Response is not operation-shaped: {}", payload))]
    NotAnOperation { payload: Value },

    #[snafu(display("Error deserializing operation record: {}", source))]
    OperationRecord { source: serde_json::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify this error per the plugin's taxonomy. See [`ErrorClass`].
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Api {
                status, payload, ..
            } => classify_api(*status, payload),
            Error::Transport { source, .. } | Error::TokenRequest { source, .. }
                if source.is_connect() || source.is_timeout() =>
            {
                ErrorClass::Transient
            }
            Error::JwtSign { .. }
            | Error::TokenExchange { .. }
            | Error::TokenRequest { .. }
            | Error::CredentialsParse { .. }
            | Error::CredentialsField { .. } => ErrorClass::Auth,
            _ => ErrorClass::Fatal,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.class() == ErrorClass::Missing
    }
}

/// Reasons the provider uses for quota and rate-limit trouble, spread across
/// `error.errors[].reason` and operation error `code` fields.
const TRANSIENT_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "quotaExceeded",
    "resourceExhausted",
    "QUOTA_EXCEEDED",
    "RESOURCE_EXHAUSTED",
];

fn classify_api(status: u16, payload: &Value) -> ErrorClass {
    if payload_has_transient_reason(payload) {
        return ErrorClass::Transient;
    }
    match status {
        404 => ErrorClass::Missing,
        400 => ErrorClass::InUse,
        401 => ErrorClass::Auth,
        403 => ErrorClass::Auth,
        429 => ErrorClass::Transient,
        500..=599 => ErrorClass::Transient,
        _ => ErrorClass::Fatal,
    }
}

fn payload_has_transient_reason(payload: &Value) -> bool {
    let errors = match payload
        .get("error")
        .and_then(|e| e.get("errors"))
        .and_then(Value::as_array)
    {
        Some(errors) => errors,
        None => return false,
    };
    errors.iter().any(|item| {
        ["reason", "code"].iter().any(|key| {
            item.get(key)
                .and_then(Value::as_str)
                .map(|value| TRANSIENT_REASONS.contains(&value))
                .unwrap_or(false)
        })
    })
}
