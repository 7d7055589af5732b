/*!

`cloudify-gcp` is the provider substrate of the GCP lifecycle plugin: signed-
JWT credentials, memoized service clients, the error taxonomy and its
classifier, the resource name canonicalizer, long-running operation handles,
and the concrete resource types behind the uniform [`GcpResource`] contract.

The lifecycle engine lives in the `cloudify-lifecycle` crate and drives
everything here through [`GcpResource`] and [`OperationHandle`].

!*/

pub mod auth;
pub mod client;
pub mod compute;
pub mod config;
pub mod container;
pub mod dns;
pub mod error;
pub mod iam;
pub mod logging;
pub mod monitoring;
pub mod naming;
pub mod operation;
pub mod pubsub;
pub mod resource;

pub use client::{client, Service, ServiceClient};
pub use config::{GcpConfig, ServiceAccount};
pub use error::{Error, ErrorClass, Result};
pub use operation::{OperationHandle, OperationScope, OperationStatus};
pub use resource::GcpResource;
