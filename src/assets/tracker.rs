use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::assets::server::LoadId;
use crate::errors::AssetError;

/// Something that happened to an asset load, reported by
/// [`AssetServer::pump`](crate::assets::AssetServer::pump).
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEvent {
    Started { id: LoadId, path: PathBuf },
    Progress { id: LoadId, loaded: u64, total: u64 },
    Loaded { id: LoadId, path: PathBuf },
    Failed { id: LoadId, path: PathBuf, error: AssetError },
    /// Every load started so far has finished, successfully or not.
    AllSettled { loaded: usize, failed: usize },
}

/// Aggregate progress across every load the server has started.
#[derive(Debug, Default)]
pub struct LoadTracker {
    items_total: usize,
    items_loaded: usize,
    items_failed: usize,
    /// (loaded, total) bytes of loads still in flight
    in_flight: FxHashMap<LoadId, (u64, u64)>,
}

impl LoadTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_start(&mut self, id: LoadId) {
        self.items_total += 1;
        self.in_flight.insert(id, (0, 0));
    }

    pub(crate) fn on_progress(&mut self, id: LoadId, loaded: u64, total: u64) {
        if let Some(entry) = self.in_flight.get_mut(&id) {
            *entry = (loaded, total);
        }
    }

    /// Records a finished load. Returns true if nothing is in flight anymore.
    pub(crate) fn on_finish(&mut self, id: LoadId, ok: bool) -> bool {
        if self.in_flight.remove(&id).is_none() {
            return false;
        }
        if ok {
            self.items_loaded += 1;
        } else {
            self.items_failed += 1;
        }
        self.in_flight.is_empty()
    }

    #[must_use]
    pub fn items_total(&self) -> usize {
        self.items_total
    }

    #[must_use]
    pub fn items_loaded(&self) -> usize {
        self.items_loaded
    }

    #[must_use]
    pub fn items_failed(&self) -> usize {
        self.items_failed
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Overall progress in `0..=1`. Finished items count fully; in-flight
    /// items count by bytes read when their size is known.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.items_total == 0 {
            return 1.0;
        }
        let partial: f64 = self
            .in_flight
            .values()
            .filter(|(_, total)| *total > 0)
            .map(|&(loaded, total)| loaded as f64 / total as f64)
            .sum();
        let done = (self.items_loaded + self.items_failed) as f64 + partial;
        (done / self.items_total as f64).clamp(0.0, 1.0) as f32
    }
}
