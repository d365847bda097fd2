//! Record types served by the daemon
//!
//! ```text
//! Account ──owns──► Notebook ──contains──► Page
//! ```

mod account;
mod notebook;
mod page;

pub use account::{Account, AccountPatch};
pub use notebook::{Notebook, NotebookPatch};
pub use page::{Page, PagePatch};

use serde::{Deserialize, Deserializer};

/// Keep an explicit `null` apart from an absent field: absent is `None`,
/// `null` is `Some(None)`. Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
