//! Identity and record capability contracts

use resource_pipeline::Fault;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Numeric identifier shared by identities and records.
pub type RecordId = u64;

/// Anything with an identifier that can be compared against ownership
/// fields.
pub trait Identity {
    fn id(&self) -> RecordId;
}

/// A persisted, owned entity.
///
/// Ownership comes in two shapes, chosen once per record type:
/// - flat: the record stores its owner, and [`Record::owner_id`] returns it
/// - chained: the record only knows its parent, [`Record::owner_id`] returns
///   `None`, and the owner is whoever owns the parent
///
/// [`Record::set_owner`] and [`Record::set_parent`] must keep the two links
/// consistent. Setting one may also fix the other, and neither may leave the
/// record pointing at different owners.
pub trait Record: Identity + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name used by storage and logs.
    const KIND: &'static str;

    /// Body accepted by partial updates.
    type Patch: PartialUpdate;

    /// Set the identifier. Storage calls this once, when the record is first
    /// persisted; the identifier never changes afterwards.
    fn assign_id(&mut self, id: RecordId);

    /// Directly stored owner, or `None` when ownership derives from the parent.
    fn owner_id(&self) -> Option<RecordId>;

    /// Structural parent. Equal to the owner for flat records owned by a user.
    fn parent_id(&self) -> RecordId;

    fn set_owner(&mut self, owner: &dyn Identity) -> Result<(), LinkError>;

    fn set_parent(&mut self, parent: &dyn Identity) -> Result<(), LinkError>;

    /// Apply submitted fields, leaving the rest untouched.
    fn apply(&mut self, patch: Self::Patch);
}

/// Body of a partial update.
///
/// A body that binds but names no field is refused like one that does not
/// bind at all.
pub trait PartialUpdate: DeserializeOwned + Send {
    /// `true` when no field was submitted.
    fn is_empty(&self) -> bool;
}

impl PartialUpdate for serde_json::Value {
    fn is_empty(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::Object(fields) => fields.is_empty(),
            _ => false,
        }
    }
}

/// A record refused an owner or parent.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("{kind} cannot be owned by {owner}: {reason}")]
    Owner {
        kind: &'static str,
        owner: RecordId,
        reason: String,
    },

    #[error("{kind} cannot be a child of {parent}: {reason}")]
    Parent {
        kind: &'static str,
        parent: RecordId,
        reason: String,
    },
}

impl From<LinkError> for Fault {
    fn from(err: LinkError) -> Self {
        Fault::Linkage(err.to_string())
    }
}

/// Assign owner and parent to a fresh record and check the result agrees
/// with both.
pub fn attach<R: Record>(
    record: &mut R,
    owner: &dyn Identity,
    parent: &dyn Identity,
) -> Result<(), Fault> {
    record.set_owner(owner)?;
    record.set_parent(parent)?;

    if record.parent_id() != parent.id() {
        return Err(Fault::Linkage(format!(
            "{} parent is {} after linking to {}",
            R::KIND,
            record.parent_id(),
            parent.id()
        )));
    }

    match record.owner_id() {
        Some(owner_id) if owner_id != owner.id() => Err(Fault::Linkage(format!(
            "{} owner is {} after linking to {}",
            R::KIND,
            owner_id,
            owner.id()
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct Caller(RecordId);

    impl Identity for Caller {
        fn id(&self) -> RecordId {
            self.0
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Todo {
        id: RecordId,
        owner_id: RecordId,
        list_id: RecordId,
        title: String,
    }

    #[derive(Deserialize)]
    struct TodoPatch {
        title: Option<String>,
    }

    impl PartialUpdate for TodoPatch {
        fn is_empty(&self) -> bool {
            self.title.is_none()
        }
    }

    impl Identity for Todo {
        fn id(&self) -> RecordId {
            self.id
        }
    }

    impl Record for Todo {
        const KIND: &'static str = "todos";
        type Patch = TodoPatch;

        fn assign_id(&mut self, id: RecordId) {
            self.id = id;
        }

        fn owner_id(&self) -> Option<RecordId> {
            Some(self.owner_id)
        }

        fn parent_id(&self) -> RecordId {
            self.list_id
        }

        fn set_owner(&mut self, owner: &dyn Identity) -> Result<(), LinkError> {
            self.owner_id = owner.id();
            Ok(())
        }

        fn set_parent(&mut self, parent: &dyn Identity) -> Result<(), LinkError> {
            if parent.id() == 0 {
                return Err(LinkError::Parent {
                    kind: Self::KIND,
                    parent: 0,
                    reason: "unsaved parent".into(),
                });
            }
            // Misroutes list 13 so the consistency check has something to catch.
            self.list_id = if parent.id() == 13 { 14 } else { parent.id() };
            Ok(())
        }

        fn apply(&mut self, patch: TodoPatch) {
            if let Some(title) = patch.title {
                self.title = title;
            }
        }
    }

    #[test]
    fn test_attach_sets_both_links() {
        let mut todo = Todo::default();
        attach(&mut todo, &Caller(1), &Caller(5)).unwrap();
        assert_eq!(todo.owner_id(), Some(1));
        assert_eq!(todo.parent_id(), 5);
    }

    #[test]
    fn test_attach_rejects_refused_parent() {
        let mut todo = Todo::default();
        let err = attach(&mut todo, &Caller(1), &Caller(0)).unwrap_err();
        assert!(matches!(err, Fault::Linkage(_)));
    }

    #[test]
    fn test_attach_detects_inconsistent_parent() {
        let mut todo = Todo::default();
        let err = attach(&mut todo, &Caller(1), &Caller(13)).unwrap_err();
        assert!(err.to_string().contains("parent is 14"));
    }

    #[test]
    fn test_apply_touches_only_submitted_fields() {
        let mut todo = Todo {
            id: 3,
            owner_id: 1,
            list_id: 1,
            title: "before".into(),
        };
        todo.apply(TodoPatch { title: None });
        assert_eq!(todo.title, "before");
        todo.apply(TodoPatch {
            title: Some("after".into()),
        });
        assert_eq!(todo.title, "after");
        assert_eq!(todo.id(), 3);
    }

    #[test]
    fn test_json_patch_emptiness() {
        assert!(PartialUpdate::is_empty(&serde_json::json!({})));
        assert!(PartialUpdate::is_empty(&serde_json::Value::Null));
        assert!(!PartialUpdate::is_empty(&serde_json::json!({ "title": null })));
    }
}
