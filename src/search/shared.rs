//! Thread-safe handle to the search engine.

use parking_lot::RwLock;
use std::sync::Arc;

use super::engine::{ActivitySearchEngine, SearchStats};
use super::place::{ActivityPlace, ScoredPlace};

/// Cloneable handle shared by request handlers.
///
/// Inserts take the write lock; searches and stats share the read lock. No
/// operation does I/O while holding the lock.
#[derive(Debug, Clone, Default)]
pub struct SharedSearchEngine {
    inner: Arc<RwLock<ActivitySearchEngine>>,
}

impl SharedSearchEngine {
    pub fn new(engine: ActivitySearchEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn insert(&self, place: ActivityPlace) {
        self.inner.write().insert(place);
    }

    /// Insert a batch under a single write lock
    pub fn insert_many(&self, places: impl IntoIterator<Item = ActivityPlace>) -> usize {
        self.inner.write().insert_many(places)
    }

    pub fn search_nearby(
        &self,
        lat: f64,
        lon: f64,
        activity: &str,
        limit: usize,
    ) -> Vec<ScoredPlace> {
        self.inner.read().search_nearby(lat, lon, activity, limit)
    }

    pub fn stats(&self) -> SearchStats {
        self.inner.read().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
