//! Trait seam over the remote collections API

use async_trait::async_trait;
use postman_sync_common::{ApiKey, Result};
use serde_json::Value;

/// Remote collection management operations
///
/// Implemented by [`crate::PostmanClient`]; tests substitute the generated
/// `MockCollectionApi`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// Create a collection; the service assigns its identifier
    async fn import_collection(&self, api_key: &ApiKey, document: &Value) -> Result<Value>;

    /// Replace the collection identified by `id`
    async fn update_collection(
        &self,
        api_key: &ApiKey,
        id: &str,
        document: &Value,
    ) -> Result<Value>;

    async fn fetch_collection(&self, api_key: &ApiKey, id: &str) -> Result<Value>;

    async fn delete_collection(&self, api_key: &ApiKey, id: &str) -> Result<Value>;
}
