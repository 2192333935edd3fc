//! Storage trait for scraped notices.
//!
//! Stores are append-only and keyed on `(date, title)`: saving a notice whose
//! key already exists is a no-op, never an update.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::notice::Notice;

/// Deduplicating notice storage.
#[async_trait]
pub trait NoticeStore: Send + Sync {
    /// Create the notice table if it does not exist yet.
    ///
    /// Idempotent; safe to call on every run.
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Insert notices whose `(date, title)` is not stored yet.
    ///
    /// Returns the number of rows inserted by this call.
    async fn save(&self, notices: &[Notice]) -> StoreResult<usize>;

    /// Number of stored notices.
    async fn count(&self) -> StoreResult<usize>;

    /// All stored notices in insertion order.
    async fn list(&self) -> StoreResult<Vec<Notice>>;
}
