//! Pages: chained ownership through their notebook

use chrono::{DateTime, Utc};
use resource_core::{Identity, LinkError, PartialUpdate, Record, RecordId};
use serde::{Deserialize, Serialize};

/// A page inside a notebook. Whoever owns the notebook owns its pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub notebook_id: RecordId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PagePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub position: Option<u32>,
}

impl PartialUpdate for PagePatch {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.position.is_none()
    }
}

impl Identity for Page {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Record for Page {
    const KIND: &'static str = "pages";
    type Patch = PagePatch;

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner_id(&self) -> Option<RecordId> {
        None
    }

    fn parent_id(&self) -> RecordId {
        self.notebook_id
    }

    // The owner is implied by the notebook.
    fn set_owner(&mut self, _owner: &dyn Identity) -> Result<(), LinkError> {
        Ok(())
    }

    fn set_parent(&mut self, parent: &dyn Identity) -> Result<(), LinkError> {
        if parent.id() == 0 {
            return Err(LinkError::Parent {
                kind: Self::KIND,
                parent: 0,
                reason: "notebook is not persisted".to_string(),
            });
        }
        self.notebook_id = parent.id();
        Ok(())
    }

    fn apply(&mut self, patch: PagePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        self.updated_at = Utc::now();
    }
}
