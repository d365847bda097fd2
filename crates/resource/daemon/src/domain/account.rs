//! Accounts: the callers of the service

use chrono::{DateTime, Utc};
use resource_core::{Identity, LinkError, PartialUpdate, Record, RecordId};
use serde::{Deserialize, Serialize};

/// A registered account.
///
/// Accounts own themselves, which lets the ownership check gate
/// `GET /accounts/:id` without a special case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
}

impl PartialUpdate for AccountPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

impl Identity for Account {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Record for Account {
    const KIND: &'static str = "accounts";
    type Patch = AccountPatch;

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner_id(&self) -> Option<RecordId> {
        Some(self.id)
    }

    fn parent_id(&self) -> RecordId {
        self.id
    }

    fn set_owner(&mut self, owner: &dyn Identity) -> Result<(), LinkError> {
        if owner.id() != self.id {
            return Err(LinkError::Owner {
                kind: Self::KIND,
                owner: owner.id(),
                reason: "accounts only own themselves".to_string(),
            });
        }
        Ok(())
    }

    fn set_parent(&mut self, parent: &dyn Identity) -> Result<(), LinkError> {
        if parent.id() != self.id {
            return Err(LinkError::Parent {
                kind: Self::KIND,
                parent: parent.id(),
                reason: "accounts have no parent".to_string(),
            });
        }
        Ok(())
    }

    fn apply(&mut self, patch: AccountPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
    }
}
