//! Notebooks: flat ownership, owned directly by an account

use chrono::{DateTime, Utc};
use super::nullable;
use resource_core::{Identity, LinkError, PartialUpdate, Record, RecordId};
use serde::{Deserialize, Serialize};

/// A notebook. Titles are unique per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub account_id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// `description: null` clears the description.
#[derive(Debug, Deserialize)]
pub struct NotebookPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl PartialUpdate for NotebookPatch {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

impl Identity for Notebook {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Record for Notebook {
    const KIND: &'static str = "notebooks";
    type Patch = NotebookPatch;

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner_id(&self) -> Option<RecordId> {
        Some(self.account_id)
    }

    fn parent_id(&self) -> RecordId {
        self.account_id
    }

    // Owner and parent are the same account.
    fn set_owner(&mut self, owner: &dyn Identity) -> Result<(), LinkError> {
        self.account_id = owner.id();
        Ok(())
    }

    fn set_parent(&mut self, parent: &dyn Identity) -> Result<(), LinkError> {
        self.account_id = parent.id();
        Ok(())
    }

    fn apply(&mut self, patch: NotebookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_core::attach;

    struct Caller(RecordId);

    impl Identity for Caller {
        fn id(&self) -> RecordId {
            self.0
        }
    }

    #[test]
    fn test_attach_links_account() {
        let mut notebook: Notebook =
            serde_json::from_str(r#"{"title":"ideas","account_id":77}"#).unwrap();
        attach(&mut notebook, &Caller(3), &Caller(3)).unwrap();
        assert_eq!(notebook.account_id, 3);
        assert_eq!(notebook.owner_id(), Some(3));
    }

    #[test]
    fn test_patch_keeps_unsubmitted_fields() {
        let mut notebook: Notebook =
            serde_json::from_str(r#"{"title":"ideas","description":"misc"}"#).unwrap();
        let patch: NotebookPatch = serde_json::from_str(r#"{"title":"plans"}"#).unwrap();
        notebook.apply(patch);
        assert_eq!(notebook.title, "plans");
        assert_eq!(notebook.description.as_deref(), Some("misc"));
    }

    #[test]
    fn test_patch_null_clears_description() {
        let mut notebook: Notebook =
            serde_json::from_str(r#"{"title":"ideas","description":"misc"}"#).unwrap();
        let patch: NotebookPatch = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert!(!patch.is_empty());
        notebook.apply(patch);
        assert_eq!(notebook.title, "ideas");
        assert_eq!(notebook.description, None);
    }

    #[test]
    fn test_patch_without_fields_is_empty() {
        let patch: NotebookPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
