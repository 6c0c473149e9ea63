//! WeatherWise - weather, geocoding and activity-place search backend
//!
//! This library provides the shared types and modules for the server and ingest binaries.

pub mod advice;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod locations;
pub mod search;
pub mod upstream;
pub mod weather;

pub use cache::ResponseCache;
pub use config::Config;
pub use locations::Location;
pub use search::{ActivityPlace, ActivitySearchEngine, ScoredPlace, SharedSearchEngine};
