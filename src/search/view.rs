//! Place shape returned to the map client.

use hashbrown::HashSet;
use serde::Serialize;

use super::grid::CoordKey;
use super::place::{ActivityPlace, ScoredPlace};
use crate::weather::round2;

/// Marker colour the client uses for activity places
pub const PLACE_ICON: &str = "red";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceView {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub place_type: String,
    pub address: String,
    pub icon: &'static str,
    /// Only present for results ranked by the local engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl From<&ActivityPlace> for PlaceView {
    fn from(place: &ActivityPlace) -> Self {
        Self {
            name: place.name.clone(),
            lat: place.lat,
            lon: place.lon,
            place_type: place.place_type.clone(),
            address: place.address.clone(),
            icon: PLACE_ICON,
            relevance_score: None,
        }
    }
}

impl From<&ScoredPlace> for PlaceView {
    fn from(scored: &ScoredPlace) -> Self {
        Self {
            relevance_score: Some(round2(scored.relevance_score)),
            ..Self::from(scored.place.as_ref())
        }
    }
}

/// Concatenate, keep the first place per rounded coordinate, cap at `limit`
pub fn merge_unique<I>(places: I, limit: usize) -> Vec<PlaceView>
where
    I: IntoIterator<Item = PlaceView>,
{
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|place| seen.insert(CoordKey::new(place.lat, place.lon)))
        .take(limit)
        .collect()
}
