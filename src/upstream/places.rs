//! Multi-request lookups built on the individual clients.

use hashbrown::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use super::{NominatimClient, NominatimPlace, NominatimQuery, OpenMeteoClient, ViewBox};
use crate::locations::Location;
use crate::search::{activity_search_terms, ActivityPlace, DEFAULT_LIMIT};

/// Half-width of the box external place searches are bounded to
const VIEWBOX_HALF_SIZE_DEG: f64 = 0.5;

const ACTIVITY_PLACES_LIMIT: u32 = 10;
const ACTIVITY_PLACES_TIMEOUT: Duration = Duration::from_secs(10);

const DISCOVERY_LIMIT: u32 = 5;
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(6);

/// Open-Meteo geocoding, falling back to Nominatim. Never fails.
pub async fn geocode_location(
    open_meteo: &OpenMeteoClient,
    nominatim: &NominatimClient,
    query: &str,
) -> Vec<Location> {
    match open_meteo.geocode(query).await {
        Ok(locations) if !locations.is_empty() => return locations,
        Ok(_) => debug!("Open-Meteo found nothing for '{}', trying Nominatim", query),
        Err(e) => warn!("Open-Meteo geocoding failed for '{}': {}", query, e),
    }

    match nominatim.search_locations(query).await {
        Ok(locations) => locations,
        Err(e) => {
            warn!("Nominatim location search failed for '{}': {}", query, e);
            Vec::new()
        }
    }
}

fn to_activity_place(result: NominatimPlace, term: &str, activity: &str) -> Option<ActivityPlace> {
    let (lat, lon) = result.coordinates()?;
    Some(ActivityPlace {
        name: result.primary_name().to_string(),
        lat,
        lon,
        place_type: term.to_string(),
        address: result.display_name,
        activity_type: activity.to_string(),
    })
}

/// One bounded search per activity term, deduplicated on exact coordinates
pub async fn find_activity_places(
    nominatim: &NominatimClient,
    lat: f64,
    lon: f64,
    activity: &str,
    location_name: &str,
) -> Vec<ActivityPlace> {
    let viewbox = ViewBox::around(lat, lon, VIEWBOX_HALF_SIZE_DEG);
    let mut places = Vec::new();

    for term in activity_search_terms(activity) {
        let query = NominatimQuery::new(
            format!("{} in {}", term, location_name),
            ACTIVITY_PLACES_LIMIT,
            ACTIVITY_PLACES_TIMEOUT,
        )
        .with_address_details()
        .bounded_to(viewbox);

        match nominatim.search(&query).await {
            Ok(results) => places.extend(
                results
                    .into_iter()
                    .filter_map(|r| to_activity_place(r, term, activity)),
            ),
            Err(e) => warn!("Error searching for {}: {}", term, e),
        }
    }

    let mut seen = HashSet::new();
    places.retain(|p| seen.insert((p.lat.to_bits(), p.lon.to_bits())));
    places.truncate(DEFAULT_LIMIT);
    places
}

/// Search phrasings tried for one term, most specific first
fn search_patterns(term: &str, location_name: &str) -> [String; 4] {
    [
        format!("{} in {}", term, location_name),
        format!("{} near {}", term, location_name),
        format!("{} {}", term, location_name),
        term.to_string(),
    ]
}

/// External fallback for the hybrid place search.
///
/// For each activity term the phrasings are tried in order and the first one
/// with results wins; a failed request abandons that term. Results are tagged
/// with the term as their type and `activity` as their bucket.
pub async fn discover_activity_places(
    nominatim: &NominatimClient,
    lat: f64,
    lon: f64,
    activity: &str,
    location_name: &str,
    term_delay: Duration,
) -> Vec<ActivityPlace> {
    let viewbox = ViewBox::around(lat, lon, VIEWBOX_HALF_SIZE_DEG);
    let mut places = Vec::new();

    for term in activity_search_terms(activity) {
        for pattern in search_patterns(term, location_name) {
            let query = NominatimQuery::new(pattern, DISCOVERY_LIMIT, DISCOVERY_TIMEOUT)
                .bounded_to(viewbox);

            match nominatim.search(&query).await {
                Ok(results) if results.is_empty() => continue,
                Ok(results) => {
                    debug!("Found {} results for '{}'", results.len(), query.q);
                    places.extend(
                        results
                            .into_iter()
                            .filter_map(|r| to_activity_place(r, term, activity)),
                    );
                    break;
                }
                Err(e) => {
                    warn!("Error searching for {}: {}", term, e);
                    break;
                }
            }
        }

        if !term_delay.is_zero() {
            tokio::time::sleep(term_delay).await;
        }
    }

    places
}
