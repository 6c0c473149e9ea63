//! Place records held by the search engine.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::grid::{grid_key, CoordKey, GridKey};

/// A point of interest that can be suggested for an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPlace {
    /// Display name, e.g. "Kovalam Beach"
    pub name: String,

    pub lat: f64,
    pub lon: f64,

    /// Free-form category, e.g. "beach" or the search term that found it
    #[serde(rename = "type")]
    pub place_type: String,

    /// Free-form address text
    pub address: String,

    /// Coarse bucket used to partition the activity index
    pub activity_type: String,
}

impl ActivityPlace {
    pub fn new(
        name: &str,
        lat: f64,
        lon: f64,
        place_type: &str,
        address: &str,
        activity_type: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
            place_type: place_type.to_string(),
            address: address.to_string(),
            activity_type: activity_type.to_string(),
        }
    }

    /// Grid cell this place is registered under
    pub fn grid_key(&self) -> GridKey {
        grid_key(self.lat, self.lon)
    }

    /// Deduplication key (4-decimal rounded coordinate)
    pub fn coord_key(&self) -> CoordKey {
        CoordKey::new(self.lat, self.lon)
    }

    /// Key used by the name index
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A query result: the stored place plus its per-query annotations.
#[derive(Debug, Clone)]
pub struct ScoredPlace {
    pub place: Arc<ActivityPlace>,
    /// Relevance in [0, 1]
    pub relevance_score: f64,
    /// Great-circle distance from the query point
    pub distance_km: f64,
}
