//! Short-lived cache for upstream API responses.

use hashbrown::HashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default time-to-live for cached responses
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Response cache keyed by request description, e.g. `"forecast:9.9312,76.2673"`.
///
/// Expired entries are ignored on read and replaced on the next insert.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock();
        let (value, stored_at) = entries.get(key)?;
        if stored_at.elapsed() < self.ttl {
            debug!("Using cached response for {}", key);
            Some(value.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.entries.lock().insert(key.into(), (value, Instant::now()));
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry, returning how many were removed
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
