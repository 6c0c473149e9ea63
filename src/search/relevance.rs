//! Relevance scoring for candidate places.

use super::grid::haversine_km;
use super::place::ActivityPlace;

/// Distance at which the proximity component reaches zero
pub const DISTANCE_NORMALIZATION_KM: f64 = 50.0;

const DISTANCE_WEIGHT: f64 = 0.4;
const NAME_PHRASE_BONUS: f64 = 0.3;
const NAME_TOKEN_BONUS: f64 = 0.2;
const ACTIVITY_TYPE_BONUS: f64 = 0.3;

/// Score a place for an activity query centred at `(lat, lon)`.
///
/// Components:
/// - proximity: `max(0, 1 - d/50km) * 0.4`
/// - name: `+0.3` if the whole activity string is in the name, otherwise `+0.2`
///   if any whitespace-separated word of it is
/// - activity type: `+0.3` if the place's activity type occurs in the activity string
///
/// The sum is capped at 1.0.
pub fn relevance(place: &ActivityPlace, activity: &str, lat: f64, lon: f64) -> f64 {
    let distance = haversine_km(place.lat, place.lon, lat, lon);
    relevance_at(place, activity, distance)
}

/// Same as [`relevance`] with the distance already known.
pub fn relevance_at(place: &ActivityPlace, activity: &str, distance_km: f64) -> f64 {
    let mut score = (1.0 - distance_km / DISTANCE_NORMALIZATION_KM).max(0.0) * DISTANCE_WEIGHT;

    let name_lower = place.name.to_lowercase();
    let query_lower = activity.to_lowercase();

    if name_lower.contains(&query_lower) {
        score += NAME_PHRASE_BONUS;
    } else if query_lower
        .split_whitespace()
        .any(|word| name_lower.contains(word))
    {
        score += NAME_TOKEN_BONUS;
    }

    if query_lower.contains(place.activity_type.as_str()) {
        score += ACTIVITY_TYPE_BONUS;
    }

    score.min(1.0)
}
