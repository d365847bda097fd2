//! Storage collaborator for resources
//!
//! The pipeline only ever talks to storage through [`RecordStore`]. Each call
//! either completes or fails before the pipeline continues.

mod memory;
mod traits;

pub use memory::InMemoryStore;
pub use traits::RecordStore;
