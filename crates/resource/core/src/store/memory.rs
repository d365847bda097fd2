//! In-memory storage implementation

use super::traits::RecordStore;
use crate::error::{StoreError, StoreResult};
use crate::record::{Record, RecordId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

type UniqueKey<R> = dyn Fn(&R) -> String + Send + Sync;

#[derive(Debug, Clone)]
struct Row<R> {
    record: R,
    deleted: bool,
}

/// In-memory storage for development and testing
///
/// Deletes are soft: rows are kept but hidden from reads.
pub struct InMemoryStore<R> {
    rows: Arc<RwLock<BTreeMap<RecordId, Row<R>>>>,
    sequence: Arc<AtomicU64>,
    unique: Option<Arc<UniqueKey<R>>>,
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> InMemoryStore<R> {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
            unique: None,
        }
    }

    /// Reject writes that would give two live siblings the same key.
    pub fn with_unique_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.unique = Some(Arc::new(key));
        self
    }

    /// Number of rows, including deleted ones
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_unique(&self, rows: &BTreeMap<RecordId, Row<R>>, record: &R) -> StoreResult<()> {
        let Some(key) = &self.unique else {
            return Ok(());
        };

        let wanted = key(record);
        let taken = rows.values().any(|row| {
            !row.deleted
                && row.record.id() != record.id()
                && row.record.parent_id() == record.parent_id()
                && key(&row.record) == wanted
        });

        if taken {
            return Err(StoreError::Conflict(format!(
                "{} '{}' already exists under {}",
                R::KIND,
                wanted,
                record.parent_id()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn find(&self, id: RecordId) -> StoreResult<Option<R>> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(&id)
            .filter(|row| !row.deleted)
            .map(|row| row.record.clone()))
    }

    async fn related(&self, parent_id: RecordId) -> StoreResult<Vec<R>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|row| !row.deleted && row.record.parent_id() == parent_id)
            .map(|row| row.record.clone())
            .collect())
    }

    async fn create(&self, mut record: R) -> StoreResult<R> {
        let mut rows = self.rows.write().await;
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        record.assign_id(id);
        self.check_unique(&rows, &record)?;

        rows.insert(
            id,
            Row {
                record: record.clone(),
                deleted: false,
            },
        );
        Ok(record)
    }

    async fn update(&self, record: R) -> StoreResult<R> {
        let mut rows = self.rows.write().await;
        self.check_unique(&rows, &record)?;

        match rows.get_mut(&record.id()) {
            Some(row) if !row.deleted => {
                row.record = record.clone();
                Ok(record)
            }
            _ => Err(StoreError::Missing {
                kind: R::KIND,
                id: record.id(),
            }),
        }
    }

    async fn delete(&self, record: &R) -> StoreResult<()> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&record.id()) {
            Some(row) if !row.deleted => {
                row.deleted = true;
                Ok(())
            }
            _ => Err(StoreError::Missing {
                kind: R::KIND,
                id: record.id(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Identity, LinkError, PartialUpdate};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Card {
        #[serde(default)]
        id: RecordId,
        #[serde(default)]
        deck_id: RecordId,
        front: String,
    }

    impl Identity for Card {
        fn id(&self) -> RecordId {
            self.id
        }
    }

    impl PartialUpdate for Card {
        fn is_empty(&self) -> bool {
            false
        }
    }

    impl Record for Card {
        const KIND: &'static str = "cards";
        type Patch = Card;

        fn assign_id(&mut self, id: RecordId) {
            self.id = id;
        }

        fn owner_id(&self) -> Option<RecordId> {
            None
        }

        fn parent_id(&self) -> RecordId {
            self.deck_id
        }

        fn set_owner(&mut self, _owner: &dyn Identity) -> Result<(), LinkError> {
            Ok(())
        }

        fn set_parent(&mut self, parent: &dyn Identity) -> Result<(), LinkError> {
            self.deck_id = parent.id();
            Ok(())
        }

        fn apply(&mut self, patch: Card) {
            self.front = patch.front;
        }
    }

    fn card(deck_id: RecordId, front: &str) -> Card {
        Card {
            id: 0,
            deck_id,
            front: front.to_string(),
        }
    }

    #[tokio::test]
    async fn test_card_crud() {
        let store = InMemoryStore::<Card>::new();

        // Create
        let created = store.create(card(1, "hola")).await.unwrap();
        assert_eq!(created.id, 1);

        // Read
        let found = store.find(created.id).await.unwrap();
        assert_eq!(found.unwrap().front, "hola");

        // Update
        let mut changed = created.clone();
        changed.front = "adios".into();
        store.update(changed).await.unwrap();
        assert_eq!(store.find(1).await.unwrap().unwrap().front, "adios");

        // Delete
        store.delete(&created).await.unwrap();
        assert!(store.find(1).await.unwrap().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_related_is_ordered_and_scoped() {
        let store = InMemoryStore::<Card>::new();
        store.create(card(1, "a")).await.unwrap();
        store.create(card(2, "b")).await.unwrap();
        let third = store.create(card(1, "c")).await.unwrap();
        store.create(card(1, "d")).await.unwrap();
        store.delete(&third).await.unwrap();

        let fronts: Vec<String> = store
            .related(1)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.front)
            .collect();
        assert_eq!(fronts, vec!["a", "d"]);
    }

    #[tokio::test]
    async fn test_unique_key_conflicts_within_parent() {
        let store = InMemoryStore::<Card>::new().with_unique_key(|c: &Card| c.front.clone());
        store.create(card(1, "same")).await.unwrap();
        store.create(card(2, "same")).await.unwrap();

        let err = store.create(card(1, "same")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unique_key_ignores_deleted_rows() {
        let store = InMemoryStore::<Card>::new().with_unique_key(|c: &Card| c.front.clone());
        let first = store.create(card(1, "same")).await.unwrap();
        store.delete(&first).await.unwrap();
        assert!(store.create(card(1, "same")).await.is_ok());
    }

    #[tokio::test]
    async fn test_write_to_deleted_record_is_missing() {
        let store = InMemoryStore::<Card>::new();
        let created = store.create(card(1, "x")).await.unwrap();
        store.delete(&created).await.unwrap();

        assert!(matches!(
            store.update(created.clone()).await,
            Err(StoreError::Missing { id: 1, .. })
        ));
        assert!(matches!(
            store.delete(&created).await,
            Err(StoreError::Missing { .. })
        ));
    }
}
