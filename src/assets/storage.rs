use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use uuid::Uuid;

struct Entry<T> {
    asset: Arc<T>,
    uuid: Option<Uuid>,
}

struct Tables<H: Key, T> {
    entries: SlotMap<H, Entry<T>>,
    by_uuid: FxHashMap<Uuid, H>,
}

/// Loaded assets of one kind, addressed by a typed handle.
///
/// The asset server writes during `pump`. Readers on any thread get shared
/// `Arc`s and never block each other.
pub struct AssetStorage<H: Key, T> {
    tables: RwLock<Tables<H, T>>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                entries: SlotMap::with_key(),
                by_uuid: FxHashMap::default(),
            }),
        }
    }

    pub fn add(&self, asset: impl Into<T>) -> H {
        self.tables.write().entries.insert(Entry {
            asset: Arc::new(asset.into()),
            uuid: None,
        })
    }

    /// Stores `asset` under `uuid`, or returns the handle already stored under it.
    pub fn add_with_uuid(&self, uuid: Uuid, asset: impl Into<T>) -> H {
        let mut tables = self.tables.write();
        if let Some(&existing) = tables.by_uuid.get(&uuid) {
            return existing;
        }
        let handle = tables.entries.insert(Entry {
            asset: Arc::new(asset.into()),
            uuid: Some(uuid),
        });
        tables.by_uuid.insert(uuid, handle);
        handle
    }

    pub fn get(&self, handle: H) -> Option<Arc<T>> {
        self.tables.read().entries.get(handle).map(|e| Arc::clone(&e.asset))
    }

    pub fn get_by_uuid(&self, uuid: &Uuid) -> Option<Arc<T>> {
        let tables = self.tables.read();
        tables
            .by_uuid
            .get(uuid)
            .and_then(|&h| tables.entries.get(h))
            .map(|e| Arc::clone(&e.asset))
    }

    pub fn get_handle_by_uuid(&self, uuid: &Uuid) -> Option<H> {
        self.tables.read().by_uuid.get(uuid).copied()
    }

    pub fn contains(&self, handle: H) -> bool {
        self.tables.read().entries.contains_key(handle)
    }

    /// Drops the storage's reference. Clones already handed out stay valid.
    pub fn remove(&self, handle: H) -> Option<Arc<T>> {
        let mut tables = self.tables.write();
        let entry = tables.entries.remove(handle)?;
        if let Some(uuid) = entry.uuid {
            tables.by_uuid.remove(&uuid);
        }
        Some(entry.asset)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.read().entries.is_empty()
    }
}
