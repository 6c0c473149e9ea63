//! Built-in places and activity search vocabulary.

use super::place::ActivityPlace;

/// Places loaded at startup so common queries resolve without upstream calls
pub fn builtin_places() -> Vec<ActivityPlace> {
    let rows: &[(&str, f64, f64, &str, &str)] = &[
        ("Marina Beach", 13.0500, 80.2820, "beach", "Chennai, Tamil Nadu"),
        ("Kovalam Beach", 8.4000, 76.9786, "beach", "Kovalam, Kerala"),
        ("Varkala Beach", 8.7376, 76.7066, "beach", "Varkala, Kerala"),
        ("Bekal Beach", 12.3949, 75.0313, "beach", "Bekal, Kerala"),
        ("Cherai Beach", 10.1418, 76.1792, "beach", "Cherai, Kerala"),
        ("Munnar Hiking Trail", 10.0889, 77.0595, "hiking", "Munnar, Kerala"),
        ("Thekkady Nature Walk", 9.6000, 77.1667, "hiking", "Thekkady, Kerala"),
        ("Wayanad Hiking Trail", 11.6854, 76.1320, "hiking", "Wayanad, Kerala"),
        ("Athirapally Trail", 10.2856, 76.5701, "hiking", "Athirapally, Kerala"),
        ("Wayanad Camping", 11.6854, 76.1320, "camping", "Wayanad, Kerala"),
        ("Munnar Camp Site", 10.0889, 77.0595, "camping", "Munnar, Kerala"),
        ("Thekkady Camping", 9.6000, 77.1667, "camping", "Thekkady, Kerala"),
        ("Kanakakkunnu Palace", 8.5241, 76.9366, "picnic", "Thiruvananthapuram, Kerala"),
        ("Veli Tourist Village", 8.4589, 76.9756, "picnic", "Thiruvananthapuram, Kerala"),
        ("Malampuzha Garden", 10.8322, 76.6916, "picnic", "Palakkad, Kerala"),
        ("Jawaharlal Nehru Stadium", 8.5241, 76.9366, "sports", "Thiruvananthapuram, Kerala"),
        ("University Stadium", 8.5465, 76.8795, "sports", "Thiruvananthapuram, Kerala"),
        ("Ponmudi Viewpoint", 8.7590, 77.1129, "photo", "Ponmudi, Kerala"),
        ("Athirapally Waterfall", 10.2856, 76.5701, "photo", "Athirapally, Kerala"),
        ("Mattupetty Dam", 10.1000, 77.1167, "photo", "Munnar, Kerala"),
    ];

    rows.iter()
        .map(|(name, lat, lon, activity, address)| {
            ActivityPlace::new(name, *lat, *lon, activity, address, activity)
        })
        .collect()
}

/// Phrases used to look an activity up in external place search.
///
/// Unknown activities are searched as-is.
pub fn activity_search_terms(activity: &str) -> Vec<&str> {
    let terms: &[&'static str] = match activity {
        "beach" => &[
            "beach",
            "seaside",
            "shore",
            "coast",
            "sand beach",
            "seashore",
            "oceanfront",
            "bay",
            "waterfront",
            "coastal area",
            "beachfront",
        ],
        "hiking" => &[
            "hiking trail",
            "mountain trail",
            "nature trail",
            "hiking",
            "walking trail",
            "trekking",
            "hill trail",
            "forest trail",
            "nature walk",
            "hiking path",
        ],
        "camping" => &[
            "campsite",
            "campground",
            "camping",
            "tent camping",
            "rv park",
            "caravan park",
            "camping ground",
            "outdoor camping",
        ],
        "picnic" => &[
            "park",
            "garden",
            "picnic area",
            "recreation area",
            "picnic site",
            "public park",
            "city park",
            "green space",
            "picnic spot",
        ],
        "sports" => &[
            "sports complex",
            "stadium",
            "sports field",
            "playing field",
            "athletic field",
            "sports ground",
            "sports center",
            "arena",
            "sports facility",
        ],
        "photo" => &[
            "viewpoint",
            "scenic spot",
            "landmark",
            "monument",
            "scenic viewpoint",
            "observation point",
            "lookout",
            "vista point",
            "panoramic view",
        ],
        _ => return vec![activity],
    };
    terms.to_vec()
}
