//! Newest-first, id-deduplicated, capped record lists.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shopfront_core::library::{RecentAsset, SavedDesign};

use crate::store::{KeyValueStore, StoreError};

/// Storage key of the design library.
pub const CONTENT_LIBRARY_KEY: &str = "content_library_designs";
pub const CONTENT_LIBRARY_CAP: usize = 100;

/// Storage key of the recent uploads list.
pub const RECENT_ASSETS_KEY: &str = "recent_uploaded_assets";
pub const RECENT_ASSETS_CAP: usize = 20;

/// Records identified by a string id.
pub trait Keyed {
    fn id(&self) -> &str;
}

impl Keyed for SavedDesign {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyed for RecentAsset {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A list persisted as a JSON array under one key.
///
/// New records are prepended; a record whose id is already present is
/// ignored, so saving is idempotent and never reorders existing entries.
/// The list is truncated to `cap` after every insert.
pub struct BoundedList<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    cap: usize,
    _records: PhantomData<fn() -> T>,
}

/// The content library: designs created through the platform.
pub type ContentLibrary = BoundedList<SavedDesign>;

/// Assets uploaded through the application.
pub type RecentAssets = BoundedList<RecentAsset>;

impl ContentLibrary {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, CONTENT_LIBRARY_KEY, CONTENT_LIBRARY_CAP)
    }
}

impl RecentAssets {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, RECENT_ASSETS_KEY, RECENT_ASSETS_CAP)
    }
}

impl<T> BoundedList<T>
where
    T: Keyed + Serialize + DeserializeOwned,
{
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: &'static str, cap: usize) -> Self {
        Self {
            store,
            key,
            cap,
            _records: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Save one record. Returns `false` when its id was already present.
    pub fn save(&self, record: T) -> Result<bool, StoreError> {
        Ok(self.save_many(std::iter::once(record))? == 1)
    }

    /// Save records one after another in input order, so the last input
    /// record ends up nearest the front. Returns how many were inserted.
    ///
    /// The whole batch is applied in a single atomic update.
    pub fn save_many(&self, records: impl IntoIterator<Item = T>) -> Result<usize, StoreError> {
        let mut pending: Vec<T> = records.into_iter().collect();
        if pending.is_empty() {
            return Ok(0);
        }

        let key = self.key;
        let cap = self.cap;
        let mut inserted = 0;

        self.store.update(key, &mut |current| {
            let mut list: Vec<T> = decode(key, current);
            inserted = 0;
            for record in std::mem::take(&mut pending) {
                if list.iter().any(|existing| existing.id() == record.id()) {
                    continue;
                }
                list.insert(0, record);
                list.truncate(cap);
                inserted += 1;
            }
            if inserted == 0 {
                return Ok(None);
            }
            Ok(Some(serde_json::to_string(&list)?))
        })?;

        tracing::debug!(key, inserted, "Saved records");
        Ok(inserted)
    }

    /// The persisted list, newest first. Missing or unreadable data
    /// yields an empty list.
    pub fn load_all(&self) -> Vec<T> {
        match self.store.get(self.key) {
            Ok(raw) => decode(self.key, raw.as_deref()),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Failed to read stored list");
                Vec::new()
            }
        }
    }

    /// Remove the persisted list entirely.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(self.key)?;
        tracing::info!(key = self.key, "Cleared stored list");
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: Option<&str>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Discarding corrupt stored list");
        Vec::new()
    })
}
