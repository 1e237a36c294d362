//! Local persistence for the content library and recent uploads.
//!
//! Records live as JSON arrays behind a small [`store::KeyValueStore`]
//! abstraction. [`list::BoundedList`] provides the newest-first,
//! deduplicated, capped list semantics on top of it.

pub mod list;
pub mod store;

pub use list::{BoundedList, ContentLibrary, Keyed, RecentAssets};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
