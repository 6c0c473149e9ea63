//! Grid-indexed activity place search.

use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::grid::{haversine_km, nearby_grids, CoordKey, GridKey};
use super::place::{ActivityPlace, ScoredPlace};
use super::relevance::relevance_at;

/// Radius of the grid sweep around the query point
pub const GRID_SEARCH_RADIUS_KM: f64 = 20.0;

/// Radius for places found through their activity bucket
pub const ACTIVITY_SEARCH_RADIUS_KM: f64 = 50.0;

/// Result count used when the caller does not ask for one
pub const DEFAULT_LIMIT: usize = 15;

/// Introspection counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStats {
    /// Unique rounded coordinates
    pub total_places: usize,
    /// Bucket sizes, including repeated inserts of the same coordinate
    pub places_by_activity: BTreeMap<String, usize>,
    pub grid_cells_used: usize,
    pub unique_names: usize,
}

/// In-memory place index.
///
/// Places are shared between four structures and never removed:
/// - grid cell -> places (append-only)
/// - activity type -> places (append-only)
/// - lowercased name -> place (last insert wins)
/// - rounded coordinate -> place (last insert wins)
#[derive(Debug, Default)]
pub struct ActivitySearchEngine {
    by_grid: HashMap<GridKey, Vec<Arc<ActivityPlace>>>,
    by_activity: HashMap<String, Vec<Arc<ActivityPlace>>>,
    by_name: HashMap<String, Arc<ActivityPlace>>,
    by_coord: HashMap<CoordKey, Arc<ActivityPlace>>,
}

impl ActivitySearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine from an initial set of places
    pub fn with_places(places: impl IntoIterator<Item = ActivityPlace>) -> Self {
        let mut engine = Self::new();
        engine.insert_many(places);
        engine
    }

    /// Register a place in every index. Never fails.
    pub fn insert(&mut self, place: ActivityPlace) {
        let place = Arc::new(place);

        self.by_grid
            .entry(place.grid_key())
            .or_default()
            .push(Arc::clone(&place));
        self.by_activity
            .entry(place.activity_type.clone())
            .or_default()
            .push(Arc::clone(&place));
        self.by_name.insert(place.name_key(), Arc::clone(&place));
        self.by_coord.insert(place.coord_key(), place);
    }

    /// Insert every place, returning how many were processed
    pub fn insert_many(&mut self, places: impl IntoIterator<Item = ActivityPlace>) -> usize {
        let mut count = 0;
        for place in places {
            self.insert(place);
            count += 1;
        }
        count
    }

    /// Find places near `(lat, lon)` for an activity.
    ///
    /// Candidates are every place in the grid block around the point plus every
    /// place in the `activity` bucket within 50 km. They are deduplicated by
    /// rounded coordinate (first seen wins), scored, sorted by descending
    /// relevance with nearer places first on ties, and truncated to `limit`.
    pub fn search_nearby(
        &self,
        lat: f64,
        lon: f64,
        activity: &str,
        limit: usize,
    ) -> Vec<ScoredPlace> {
        let start = Instant::now();

        let mut candidates: Vec<&Arc<ActivityPlace>> = Vec::new();
        for grid in nearby_grids(lat, lon, GRID_SEARCH_RADIUS_KM) {
            if let Some(places) = self.by_grid.get(&grid) {
                candidates.extend(places);
            }
        }

        if let Some(places) = self.by_activity.get(activity) {
            candidates.extend(places.iter().filter(|place| {
                haversine_km(lat, lon, place.lat, place.lon) <= ACTIVITY_SEARCH_RADIUS_KM
            }));
        }

        let mut seen: HashSet<CoordKey> = HashSet::with_capacity(candidates.len());
        let mut results: Vec<ScoredPlace> = candidates
            .into_iter()
            .filter(|place| seen.insert(place.coord_key()))
            .map(|place| {
                let distance_km = haversine_km(lat, lon, place.lat, place.lon);
                ScoredPlace {
                    place: Arc::clone(place),
                    relevance_score: relevance_at(place, activity, distance_km),
                    distance_km,
                }
            })
            .collect();

        rank(&mut results);
        results.truncate(limit);

        debug!(
            "Local search completed in {:.2}ms, found {} places",
            start.elapsed().as_secs_f64() * 1000.0,
            results.len()
        );

        results
    }

    /// Most recently inserted place with this name (case-insensitive).
    ///
    /// Library lookup for embedders; no HTTP route exposes it.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<ActivityPlace>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Most recently inserted place at this rounded coordinate. Library lookup,
    /// like [`Self::get_by_name`].
    pub fn get_by_coordinate(&self, lat: f64, lon: f64) -> Option<Arc<ActivityPlace>> {
        self.by_coord.get(&CoordKey::new(lat, lon)).cloned()
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            total_places: self.by_coord.len(),
            places_by_activity: self
                .by_activity
                .iter()
                .map(|(activity, places)| (activity.clone(), places.len()))
                .collect(),
            grid_cells_used: self.by_grid.len(),
            unique_names: self.by_name.len(),
        }
    }

    /// Number of unique rounded coordinates
    pub fn len(&self) -> usize {
        self.by_coord.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_coord.is_empty()
    }
}

/// Descending relevance, nearest first on equal relevance
fn rank(results: &mut [ScoredPlace]) {
    results.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| a.distance_km.total_cmp(&b.distance_km))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, lat: f64, lon: f64, activity: &str) -> ActivityPlace {
        ActivityPlace::new(name, lat, lon, activity, "Kerala", activity)
    }

    /// Latitude offset that puts a point `km` north of `lat` on the haversine sphere
    fn lat_offset_km(km: f64) -> f64 {
        km / 111.19492664455873
    }

    #[test]
    fn test_empty_engine_returns_empty() {
        let engine = ActivitySearchEngine::new();
        assert!(engine.search_nearby(8.4, 76.98, "beach", 15).is_empty());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_far_off_query_point_is_empty() {
        let engine = ActivitySearchEngine::with_places(crate::search::builtin_places());
        assert!(engine.search_nearby(1.0e9, 76.98, "beach", 15).is_empty());
        assert!(engine.search_nearby(-1.0e9, -1.0e9, "hiking", 15).is_empty());
        assert!(engine.search_nearby(f64::NAN, 76.98, "beach", 15).is_empty());
    }

    #[test]
    fn test_kovalam_end_to_end() {
        let mut engine = ActivitySearchEngine::new();
        engine.insert(ActivityPlace::new(
            "Kovalam Beach",
            8.4000,
            76.9786,
            "beach",
            "Kovalam, Kerala",
            "beach",
        ));
        engine.insert(place("Veli Tourist Village", 8.4589, 76.9756, "picnic"));

        let results = engine.search_nearby(8.40, 76.98, "beach", 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].place.name, "Kovalam Beach");
        assert!(results[0].relevance_score >= 0.9);
        assert!(results[0].distance_km < 0.2);
    }

    #[test]
    fn test_place_found_at_its_own_coordinate() {
        let places = [
            place("Munnar Hiking Trail", 10.0889, 77.0595, "hiking"),
            place("Cherai Beach", 10.1418, 76.1792, "beach"),
            place("Mattupetty Dam", 10.1, 77.1167, "photo"),
        ];
        let engine = ActivitySearchEngine::with_places(places.clone());

        for p in &places {
            let results = engine.search_nearby(p.lat, p.lon, &p.activity_type, 15);
            let hit = results
                .iter()
                .find(|r| r.place.name == p.name)
                .expect("place should be returned");
            // Distance component alone is 0.4 at zero distance
            assert!(hit.distance_km < 1e-9);
            assert!(hit.relevance_score >= 0.4 - 1e-9);
        }
    }

    #[test]
    fn test_duplicate_coordinates_returned_once() {
        let mut engine = ActivitySearchEngine::new();
        engine.insert(place("Cherai Beach", 10.14181, 76.17921, "beach"));
        engine.insert(place("Cherai Beach North", 10.14179, 76.17919, "beach"));

        let results = engine.search_nearby(10.1418, 76.1792, "beach", 15);
        assert_eq!(results.len(), 1);
        // First inserted wins in the result list
        assert_eq!(results[0].place.name, "Cherai Beach");

        // Coordinate index keeps the latest insert
        let latest = engine.get_by_coordinate(10.1418, 76.1792).unwrap();
        assert_eq!(latest.name, "Cherai Beach North");
    }

    #[test]
    fn test_nearer_place_scores_higher() {
        let mut engine = ActivitySearchEngine::new();
        engine.insert(place("Far Park", 8.4 + lat_offset_km(5.0), 76.98, "sports"));
        engine.insert(place("Near Park", 8.4 + lat_offset_km(2.0), 76.98, "sports"));
        // Outside the grid block and not in the queried bucket
        engine.insert(place("Other Park", 8.4 - lat_offset_km(60.0), 76.98, "sports"));

        let results = engine.search_nearby(8.4, 76.98, "picnic", 15);
        let names: Vec<&str> = results.iter().map(|r| r.place.name.as_str()).collect();
        assert_eq!(names, vec!["Near Park", "Far Park"]);
    }

    #[test]
    fn test_rank_breaks_ties_by_distance() {
        let scored = |name: &str, relevance_score: f64, distance_km: f64| ScoredPlace {
            place: Arc::new(place(name, 0.0, 0.0, "x")),
            relevance_score,
            distance_km,
        };
        let mut results = vec![
            scored("far", 0.5, 9.0),
            scored("best", 0.9, 20.0),
            scored("near", 0.5, 1.0),
        ];

        rank(&mut results);

        let names: Vec<&str> = results.iter().map(|r| r.place.name.as_str()).collect();
        assert_eq!(names, vec!["best", "near", "far"]);
    }

    #[test]
    fn test_activity_bucket_radius_boundary() {
        let mut engine = ActivitySearchEngine::new();
        engine.insert(place("Inside", 8.4 + lat_offset_km(49.0), 76.98, "camping"));
        engine.insert(place("Outside", 8.4 + lat_offset_km(51.0), 76.98, "camping"));

        let results = engine.search_nearby(8.4, 76.98, "camping", 15);
        let names: Vec<&str> = results.iter().map(|r| r.place.name.as_str()).collect();
        assert_eq!(names, vec!["Inside"]);
    }

    #[test]
    fn test_grid_sweep_finds_other_activities() {
        let mut engine = ActivitySearchEngine::new();
        // 15 km east, registered under a different activity than queried
        let lon = 76.98 + 15.0 / (111.19492664455873 * 8.4f64.to_radians().cos());
        engine.insert(place("University Stadium", 8.4, lon, "sports"));

        let results = engine.search_nearby(8.4, 76.98, "beach", 15);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].place.name, "University Stadium");
        assert!((results[0].distance_km - 15.0).abs() < 0.1);
    }

    #[test]
    fn test_limit_truncates() {
        let places = (0..30).map(|i| {
            place(
                &format!("Beach {}", i),
                8.4 + i as f64 * 0.001,
                76.98,
                "beach",
            )
        });
        let engine = ActivitySearchEngine::with_places(places);

        assert_eq!(engine.search_nearby(8.4, 76.98, "beach", DEFAULT_LIMIT).len(), 15);
        assert_eq!(engine.search_nearby(8.4, 76.98, "beach", 3).len(), 3);
        assert!(engine.search_nearby(8.4, 76.98, "beach", 0).is_empty());

        let results = engine.search_nearby(8.4, 76.98, "beach", 3);
        assert_eq!(results[0].place.name, "Beach 0");
    }

    #[test]
    fn test_stats_counts() {
        let mut engine = ActivitySearchEngine::new();
        engine.insert(place("Kovalam Beach", 8.4, 76.9786, "beach"));
        engine.insert(place("Kovalam Beach", 8.40001, 76.97861, "beach"));
        engine.insert(place("Varkala Beach", 8.7376, 76.7066, "beach"));
        engine.insert(place("Munnar Hiking Trail", 10.0889, 77.0595, "hiking"));

        let stats = engine.stats();
        assert_eq!(stats.total_places, 3);
        assert_eq!(stats.places_by_activity.get("beach"), Some(&3));
        assert_eq!(stats.places_by_activity.get("hiking"), Some(&1));
        assert_eq!(stats.grid_cells_used, 3);
        assert_eq!(stats.unique_names, 3);
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn test_get_by_name_is_case_insensitive() {
        let engine = ActivitySearchEngine::with_places([place("Bekal Beach", 12.3949, 75.0313, "beach")]);
        assert!(engine.get_by_name("bekal beach").is_some());
        assert!(engine.get_by_name("BEKAL BEACH").is_some());
        assert!(engine.get_by_name("Bekal").is_none());
    }
}
