//! Storage trait definitions

use crate::error::StoreResult;
use crate::record::{Record, RecordId};
use async_trait::async_trait;

/// Persistence for one record type
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Get a live (not deleted) record by ID
    async fn find(&self, id: RecordId) -> StoreResult<Option<R>>;

    /// List live records under a parent, ordered by ID
    async fn related(&self, parent_id: RecordId) -> StoreResult<Vec<R>>;

    /// Persist a new record, returning it with its assigned ID
    async fn create(&self, record: R) -> StoreResult<R>;

    /// Write back an existing record
    async fn update(&self, record: R) -> StoreResult<R>;

    /// Delete a record. Deleted records are invisible to `find` and `related`
    async fn delete(&self, record: &R) -> StoreResult<()>;
}
