//! Activity place search.
//!
//! A coarse 0.1° grid plus a per-activity bucket, queried together and
//! ranked by a distance/text relevance score. Everything lives in memory.

mod engine;
mod grid;
mod place;
mod relevance;
mod seed;
mod shared;
mod view;

pub use engine::{
    ActivitySearchEngine, SearchStats, ACTIVITY_SEARCH_RADIUS_KM, DEFAULT_LIMIT,
    GRID_SEARCH_RADIUS_KM,
};
pub use grid::{grid_key, haversine_km, is_valid_coordinate, nearby_grids, CoordKey, GridKey};
pub use place::{ActivityPlace, ScoredPlace};
pub use relevance::relevance;
pub use seed::{activity_search_terms, builtin_places};
pub use shared::SharedSearchEngine;
pub use view::{merge_unique, PlaceView, PLACE_ICON};
