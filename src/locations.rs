//! Built-in location directory and country flags.

use serde::{Deserialize, Serialize};

/// Maximum results from the local directory
pub const MAX_LOCAL_RESULTS: usize = 15;

/// Flag shown when the country code is unusable
pub const FALLBACK_FLAG: &str = "📍";

/// A named place the client can pick as its weather location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub emoji: String,
}

impl Location {
    fn builtin(name: &str, lat: f64, lon: f64, country: &str, emoji: &str, region: &str) -> Self {
        Self {
            name: name.to_string(),
            country: country.to_string(),
            region: Some(region.to_string()),
            state: None,
            lat,
            lon,
            emoji: emoji.to_string(),
        }
    }
}

/// Cities answered without an upstream geocoding call
pub fn builtin_locations() -> Vec<Location> {
    let rows: &[(&str, f64, f64, &str, &str, &str)] = &[
        // Kerala
        ("Kanjirapally", 9.7478, 76.6679, "India", "🌴", "Kerala"),
        ("Kochi", 9.9312, 76.2673, "India", "🛳️", "Kerala"),
        ("Thiruvananthapuram", 8.5241, 76.9366, "India", "🏛️", "Kerala"),
        ("Kozhikode", 11.2588, 75.7804, "India", "🌊", "Kerala"),
        ("Munnar", 10.0889, 77.0595, "India", "🏔️", "Kerala"),
        ("Alappuzha", 9.4981, 76.3388, "India", "🚤", "Kerala"),
        ("Thrissur", 10.5276, 76.2144, "India", "🐘", "Kerala"),
        ("Kollam", 8.8932, 76.6141, "India", "🏖️", "Kerala"),
        ("Palakkad", 10.7867, 76.6548, "India", "🌳", "Kerala"),
        ("Kannur", 11.8745, 75.3704, "India", "🎭", "Kerala"),
        ("Kottayam", 9.5916, 76.5222, "India", "📚", "Kerala"),
        ("Idukki", 9.9189, 77.1025, "India", "🌄", "Kerala"),
        ("Wayanad", 11.6854, 76.1320, "India", "🌿", "Kerala"),
        ("Pathanamthitta", 9.2648, 76.7870, "India", "🛕", "Kerala"),
        ("Malappuram", 11.0732, 76.0740, "India", "📖", "Kerala"),
        ("Kasargod", 12.4996, 74.9869, "India", "🏰", "Kerala"),
        ("Perumbavoor", 10.1151, 76.4770, "India", "🏭", "Kerala"),
        ("Thodupuzha", 9.8943, 76.7176, "India", "⛰️", "Kerala"),
        ("Changanassery", 9.4428, 76.5368, "India", "⛪", "Kerala"),
        ("Pala", 9.7128, 76.6825, "India", "🌅", "Kerala"),
        // Other Indian cities
        ("Bangalore", 12.9716, 77.5946, "India", "💻", "Karnataka"),
        ("Mumbai", 19.0760, 72.8777, "India", "🎬", "Maharashtra"),
        ("Delhi", 28.6139, 77.2090, "India", "🏛️", "Delhi"),
        ("Chennai", 13.0827, 80.2707, "India", "🎭", "Tamil Nadu"),
        ("Kolkata", 22.5726, 88.3639, "India", "🚎", "West Bengal"),
        ("Hyderabad", 17.3850, 78.4867, "India", "💎", "Telangana"),
        // North America
        ("New York", 40.7128, -74.0060, "USA", "🗽", "North America"),
        ("Los Angeles", 34.0522, -118.2437, "USA", "🌴", "North America"),
        ("Toronto", 43.6532, -79.3832, "Canada", "🍁", "North America"),
        // Europe
        ("London", 51.5074, -0.1278, "UK", "🇬🇧", "Europe"),
        ("Paris", 48.8566, 2.3522, "France", "🗼", "Europe"),
        // Asia
        ("Tokyo", 35.6762, 139.6503, "Japan", "🇯🇵", "Asia"),
        ("Singapore", 1.3521, 103.8198, "Singapore", "🦁", "Asia"),
        ("Dubai", 25.2048, 55.2708, "UAE", "🏜️", "Asia"),
    ];

    rows.iter()
        .map(|(name, lat, lon, country, emoji, region)| {
            Location::builtin(name, *lat, *lon, country, emoji, region)
        })
        .collect()
}

/// Search the built-in directory.
///
/// Matches the query as a case-insensitive substring of the name, country or
/// region. Names starting with the query come first, then names that start
/// with it once spaces are removed, then shorter names.
pub fn search_local(query: &str) -> Vec<Location> {
    if query.chars().count() < 2 {
        return Vec::new();
    }

    let query_lower = query.to_lowercase().trim().to_string();
    let query_compact = query_lower.replace(' ', "");

    let mut results: Vec<Location> = builtin_locations()
        .into_iter()
        .filter(|loc| {
            loc.name.to_lowercase().contains(&query_lower)
                || loc.country.to_lowercase().contains(&query_lower)
                || loc
                    .region
                    .as_deref()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&query_lower)
        })
        .collect();

    results.sort_by_key(|loc| {
        let name = loc.name.to_lowercase();
        (
            !name.starts_with(&query_lower),
            !name.replace(' ', "").starts_with(&query_compact),
            loc.name.chars().count(),
        )
    });
    results.truncate(MAX_LOCAL_RESULTS);
    results
}

/// Regional-indicator flag for a two-letter country code
pub fn country_flag(country_code: &str) -> String {
    let code = country_code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return FALLBACK_FLAG.to_string();
    }

    code.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(c as u32 + 127397))
        .collect()
}
