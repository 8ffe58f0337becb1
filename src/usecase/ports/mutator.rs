use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::MutationError;

/// Write side of one entity endpoint.
#[async_trait(?Send)]
pub trait RecordMutator {
    async fn delete(&self, id: &str) -> Result<(), MutationError>;

    async fn create(&self, body: &Value) -> Result<(), MutationError>;

    async fn update(&self, id: &str, body: &Value) -> Result<(), MutationError>;
}
