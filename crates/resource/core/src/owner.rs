//! Owner resolution through parent chains
//!
//! Records with flat ownership carry their owner. Records with chained
//! ownership only point at a parent; their owner is found by walking up the
//! chain until a record that stores its owner directly is reached.

use crate::error::StoreResult;
use crate::record::{Record, RecordId};
use crate::store::RecordStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves who owns the parent record `parent_id`.
#[async_trait]
pub trait ParentOwner: Send + Sync {
    /// `Ok(None)` when the chain ends without an owner (missing or deleted
    /// parent, or a chain longer than the resolver knows about).
    async fn owner_of(&self, parent_id: RecordId) -> StoreResult<Option<RecordId>>;
}

/// End of a parent chain. Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootOwner;

#[async_trait]
impl ParentOwner for RootOwner {
    async fn owner_of(&self, _parent_id: RecordId) -> StoreResult<Option<RecordId>> {
        Ok(None)
    }
}

/// One link of a parent chain: loads the parent `P` and reads its owner,
/// deferring to `next` if `P` derives its own ownership from a parent.
pub struct ParentChain<P, N = RootOwner> {
    parents: Arc<dyn RecordStore<P>>,
    next: N,
}

impl<P: Record> ParentChain<P> {
    pub fn new(parents: Arc<dyn RecordStore<P>>) -> Self {
        Self {
            parents,
            next: RootOwner,
        }
    }
}

impl<P: Record, N: ParentOwner> ParentChain<P, N> {
    /// Continue the walk with `next` for grandparents.
    pub fn then<M: ParentOwner>(self, next: M) -> ParentChain<P, M> {
        ParentChain {
            parents: self.parents,
            next,
        }
    }
}

#[async_trait]
impl<P: Record, N: ParentOwner> ParentOwner for ParentChain<P, N> {
    async fn owner_of(&self, parent_id: RecordId) -> StoreResult<Option<RecordId>> {
        let Some(parent) = self.parents.find(parent_id).await? else {
            tracing::debug!(kind = P::KIND, parent_id, "Parent not found while resolving owner");
            return Ok(None);
        };

        match parent.owner_id() {
            Some(owner) => Ok(Some(owner)),
            None => self.next.owner_of(parent.parent_id()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Identity, LinkError};
    use crate::store::InMemoryStore;
    use serde::{Deserialize, Serialize};

    /// Flat: owned by an account.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Board {
        id: RecordId,
        account_id: RecordId,
    }

    /// Chained: owned through its board.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Column {
        id: RecordId,
        board_id: RecordId,
    }

    impl Identity for Board {
        fn id(&self) -> RecordId {
            self.id
        }
    }

    impl Identity for Column {
        fn id(&self) -> RecordId {
            self.id
        }
    }

    impl Record for Board {
        const KIND: &'static str = "boards";
        type Patch = serde_json::Value;

        fn assign_id(&mut self, id: RecordId) {
            self.id = id;
        }
        fn owner_id(&self) -> Option<RecordId> {
            Some(self.account_id)
        }
        fn parent_id(&self) -> RecordId {
            self.account_id
        }
        fn set_owner(&mut self, owner: &dyn Identity) -> Result<(), LinkError> {
            self.account_id = owner.id();
            Ok(())
        }
        fn set_parent(&mut self, parent: &dyn Identity) -> Result<(), LinkError> {
            self.account_id = parent.id();
            Ok(())
        }
        fn apply(&mut self, _patch: serde_json::Value) {}
    }

    impl Record for Column {
        const KIND: &'static str = "columns";
        type Patch = serde_json::Value;

        fn assign_id(&mut self, id: RecordId) {
            self.id = id;
        }
        fn owner_id(&self) -> Option<RecordId> {
            None
        }
        fn parent_id(&self) -> RecordId {
            self.board_id
        }
        fn set_owner(&mut self, _owner: &dyn Identity) -> Result<(), LinkError> {
            Ok(())
        }
        fn set_parent(&mut self, parent: &dyn Identity) -> Result<(), LinkError> {
            self.board_id = parent.id();
            Ok(())
        }
        fn apply(&mut self, _patch: serde_json::Value) {}
    }

    #[tokio::test]
    async fn test_single_link_reads_parent_owner() {
        let boards = Arc::new(InMemoryStore::<Board>::new());
        let board = boards
            .create(Board {
                id: 0,
                account_id: 7,
            })
            .await
            .unwrap();

        let chain = ParentChain::new(boards.clone() as Arc<dyn RecordStore<Board>>);
        assert_eq!(chain.owner_of(board.id).await.unwrap(), Some(7));
        assert_eq!(chain.owner_of(board.id + 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_two_links_walk_to_grandparent() {
        let boards = Arc::new(InMemoryStore::<Board>::new());
        let columns = Arc::new(InMemoryStore::<Column>::new());
        let board = boards
            .create(Board {
                id: 0,
                account_id: 9,
            })
            .await
            .unwrap();
        let column = columns
            .create(Column {
                id: 0,
                board_id: board.id,
            })
            .await
            .unwrap();

        // Resolving the owner of something whose parent is a column.
        let chain = ParentChain::new(columns.clone() as Arc<dyn RecordStore<Column>>)
            .then(ParentChain::new(boards.clone() as Arc<dyn RecordStore<Board>>));
        assert_eq!(chain.owner_of(column.id).await.unwrap(), Some(9));

        // Without the second link the walk stops at the column.
        let short = ParentChain::new(columns as Arc<dyn RecordStore<Column>>);
        assert_eq!(short.owner_of(column.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_deleted_parent_resolves_nothing() {
        let boards = Arc::new(InMemoryStore::<Board>::new());
        let board = boards
            .create(Board {
                id: 0,
                account_id: 3,
            })
            .await
            .unwrap();
        boards.delete(&board).await.unwrap();

        let chain = ParentChain::new(boards as Arc<dyn RecordStore<Board>>);
        assert_eq!(chain.owner_of(board.id).await.unwrap(), None);
    }
}
