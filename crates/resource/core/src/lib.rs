//! Ownership-gated CRUD resources
//!
//! A [`Resource`] turns a [`RecordStore`] into the five canonical handlers
//! (list, create, read, update, delete) and the finder stages that feed them:
//! lookup by path identifier (`404` when absent) and the ownership check
//! (`401` when the caller does not own the record). Everything is assembled
//! from `resource-pipeline` primitives, so each stage can be tested and
//! recombined on its own.
//!
//! Two ownership shapes are supported, one per record type:
//! - flat: the record stores its owner
//! - chained: the owner is found through the record's parent, see
//!   [`ParentChain`]

pub mod error;
pub mod finder;
pub mod link;
pub mod owner;
pub mod record;
pub mod resource;
pub mod store;

pub use error::{ErrorResponse, Rejection, StoreError, StoreErrorKind, StoreResult};
pub use finder::{lookup, ownership_check, parse_id, resolve_owner};
pub use owner::{ParentChain, ParentOwner, RootOwner};
pub use record::{attach, Identity, LinkError, PartialUpdate, Record, RecordId};
pub use resource::{created, json, Resource, ResourceConfig, BIND_FAILURE};
pub use store::{InMemoryStore, RecordStore};
