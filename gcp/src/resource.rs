use crate::error::Result;
use serde_json::Value;

/// The uniform contract every concrete resource type implements. The
/// lifecycle engine drives resources exclusively through this trait; the
/// concrete types differ only in request/response translation.
///
/// `create` and `delete` return the provider's raw response. When that
/// response is operation-shaped the engine tracks it to completion; when it
/// is the resource body itself the mutation is already complete.
///
/// Some resources carry extras (`update`, `set_tags`, `attach_disk`, ...);
/// those are inherent methods on the concrete types and follow the same
/// request/response conventions.
#[async_trait::async_trait]
pub trait GcpResource: Send + Sync {
    /// The provider kind tag, e.g. `compute#instance`.
    fn kind(&self) -> &str;

    /// The provider-canonical resource name.
    fn name(&self) -> &str;

    /// Pure translation from this resource's configuration to the provider
    /// request body.
    fn to_body(&self) -> Value;

    /// Idempotent read of the current provider-side representation.
    async fn get(&self) -> Result<Value>;

    /// Issue the insert call.
    async fn create(&self) -> Result<Value>;

    /// Issue the delete call.
    async fn delete(&self) -> Result<Value>;
}
