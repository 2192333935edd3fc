//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::store::NoticeStore;
use crate::types::notice::{Notice, NoticeKey};

/// In-memory notice storage with the same insert-or-ignore semantics as
/// the SQLite store.
///
/// Data is lost on restart.
#[derive(Default)]
pub struct MemoryNoticeStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    keys: HashSet<NoticeKey>,
    notices: Vec<Notice>,
}

impl MemoryNoticeStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.keys.clear();
        inner.notices.clear();
    }

    /// Check whether a notice with this key is stored.
    pub fn contains(&self, key: &NoticeKey) -> bool {
        self.inner.read().unwrap().keys.contains(key)
    }
}

#[async_trait]
impl NoticeStore for MemoryNoticeStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn save(&self, notices: &[Notice]) -> StoreResult<usize> {
        let mut inner = self.inner.write().unwrap();
        let mut inserted = 0;

        for notice in notices {
            if inner.keys.insert(notice.key()) {
                inner.notices.push(notice.clone());
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.inner.read().unwrap().notices.len())
    }

    async fn list(&self) -> StoreResult<Vec<Notice>> {
        Ok(self.inner.read().unwrap().notices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_or_ignore() {
        let store = MemoryNoticeStore::new();
        let first = Notice::new("Sports Day", "2024-02-10").with_description("Wear whites");
        let again = Notice::new("Sports Day", "2024-02-10").with_description("Changed");

        assert_eq!(store.save(&[first.clone()]).await.unwrap(), 1);
        assert_eq!(store.save(&[again]).await.unwrap(), 0);

        let stored = store.list().await.unwrap();
        assert_eq!(stored, vec![first.clone()]);
        assert!(store.contains(&first.key()));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryNoticeStore::new();
        store.save(&[Notice::new("A", "1")]).await.unwrap();
        store.clear();

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.save(&[Notice::new("A", "1")]).await.unwrap(), 1);
    }
}
