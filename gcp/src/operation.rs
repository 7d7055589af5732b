//! Long-running operation handles.
//!
//! Mutating calls against the compute and container services return an
//! Operation that the caller must poll to completion at the matching scope's
//! `*Operations` endpoint. The handle is serialized into the instance's
//! `_operation` runtime property between lifecycle invocations; polling is a
//! single non-blocking `get` per invocation.

use crate::client::ServiceClient;
use crate::error::{self, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    #[default]
    Pending,
    Running,
    Done,
}

serde_plain::derive_display_from_serialize!(OperationStatus);
serde_plain::derive_fromstr_from_deserialize!(OperationStatus);

/// Which `*Operations` endpoint the operation is polled at. Region and zone
/// carry the basename of the URL the provider returned.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationScope {
    #[default]
    Global,
    Region(String),
    Zone(String),
}

/// The persisted record of one in-flight operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationHandle {
    pub name: String,
    /// Missing on rehydration means the record predates a status write;
    /// treat as not-yet-started.
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(default)]
    pub scope: OperationScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl OperationHandle {
    /// Classify a mutating call's response. Returns `None` when the response
    /// is not operation-shaped (several services answer with the resource
    /// body directly; those mutations are complete as soon as they return).
    pub fn from_response(payload: &Value) -> Option<Self> {
        let name = payload.get("name").and_then(Value::as_str)?;
        let status: OperationStatus = payload
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())?;

        let scope = if let Some(zone) = payload.get("zone").and_then(Value::as_str) {
            OperationScope::Zone(basename(zone))
        } else if let Some(region) = payload.get("region").and_then(Value::as_str) {
            OperationScope::Region(basename(region))
        } else {
            OperationScope::Global
        };

        Some(Self {
            name: name.to_string(),
            status,
            scope,
            self_link: payload
                .get("selfLink")
                .and_then(Value::as_str)
                .map(str::to_string),
            error: payload.get("error").cloned(),
        })
    }

    /// Rehydrate a persisted `_operation` record.
    pub fn from_record(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).context(error::OperationRecordSnafu)
    }

    pub fn to_record(&self) -> Result<Value> {
        serde_json::to_value(self).context(error::OperationRecordSnafu)
    }

    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }

    /// The terminal error payload, if the operation finished badly.
    pub fn failure(&self) -> Option<&Value> {
        match self.status {
            OperationStatus::Done => self.error.as_ref(),
            _ => None,
        }
    }

    /// The service-relative path of the matching `*Operations.get` endpoint.
    pub fn poll_path(&self, project: &str) -> String {
        match &self.scope {
            OperationScope::Global => {
                format!("projects/{}/global/operations/{}", project, self.name)
            }
            OperationScope::Region(region) => format!(
                "projects/{}/regions/{}/operations/{}",
                project, region, self.name
            ),
            OperationScope::Zone(zone) => format!(
                "projects/{}/zones/{}/operations/{}",
                project, zone, self.name
            ),
        }
    }

    /// Issue one poll and return the refreshed handle. Prefers the
    /// operation's own selfLink so services with non-compute operation
    /// endpoints (container) are polled at the right place.
    pub async fn refresh(&self, client: &ServiceClient, project: &str) -> Result<Self> {
        let payload = match &self.self_link {
            Some(link) => client.get(link).await?,
            None => client.get(&self.poll_path(project)).await?,
        };
        Self::from_response(&payload).ok_or(Error::NotAnOperation { payload })
    }
}

fn basename(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}
