//! Bulk place input: validation and CSV loading.

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::search::ActivityPlace;

pub const DEFAULT_PLACE_TYPE: &str = "unknown";
pub const DEFAULT_ACTIVITY_TYPE: &str = "general";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid place at index {index}: {reason}")]
    InvalidPlace { index: usize, reason: String },
}

/// A place as submitted by a client or read from a dataset file.
///
/// Only `name`, `lat` and `lon` are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceInput {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
}

impl PlaceInput {
    /// Check the record before it reaches the index; `index` is its position in the batch
    pub fn validate(&self, index: usize) -> Result<(), DatasetError> {
        let invalid = |reason: String| DatasetError::InvalidPlace { index, reason };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(invalid(format!("latitude {} out of range", self.lat)));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(invalid(format!("longitude {} out of range", self.lon)));
        }
        Ok(())
    }

    pub fn into_place(self) -> ActivityPlace {
        ActivityPlace {
            name: self.name,
            lat: self.lat,
            lon: self.lon,
            place_type: self
                .place_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_PLACE_TYPE.to_string()),
            address: self.address.unwrap_or_default(),
            activity_type: self
                .activity_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_ACTIVITY_TYPE.to_string()),
        }
    }
}

/// Validate a whole batch, failing on the first bad record
pub fn validate_all(places: &[PlaceInput]) -> Result<(), DatasetError> {
    places
        .iter()
        .enumerate()
        .try_for_each(|(index, place)| place.validate(index))
}

/// Load places from a CSV file with header `name,lat,lon,type,address,activity_type`.
///
/// Files ending in `.gz` are decompressed. Optional columns may be empty or absent.
pub fn load_places_csv(path: &Path) -> Result<Vec<PlaceInput>, DatasetError> {
    info!("Loading places from {}", path.display());

    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let places = read_places_csv(reader)?;
    info!("Loaded {} places", places.len());
    Ok(places)
}

/// Parse and validate CSV place records from any reader
pub fn read_places_csv<R: Read>(reader: R) -> Result<Vec<PlaceInput>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut places = Vec::new();
    for (index, result) in csv_reader.deserialize::<PlaceInput>().enumerate() {
        let place = result?;
        place.validate(index)?;
        places.push(place);
    }
    Ok(places)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const SAMPLE: &str = "name,lat,lon,type,address,activity_type
Kovalam Beach,8.4000,76.9786,beach,\"Kovalam, Kerala\",beach
Veli Tourist Village,8.4589,76.9756,,,
";

    #[test]
    fn test_defaults_applied() {
        let input: PlaceInput =
            serde_json::from_value(serde_json::json!({"name": "Lookout", "lat": 1.0, "lon": 2.0}))
                .unwrap();
        let place = input.into_place();
        assert_eq!(place.place_type, "unknown");
        assert_eq!(place.address, "");
        assert_eq!(place.activity_type, "general");
    }

    #[test]
    fn test_validation() {
        let ok = PlaceInput {
            name: "Bekal Beach".to_string(),
            lat: 12.3949,
            lon: 75.0313,
            place_type: None,
            address: None,
            activity_type: None,
        };
        assert!(ok.validate(0).is_ok());

        let bad_lat = PlaceInput { lat: 91.0, ..ok.clone() };
        assert!(matches!(
            bad_lat.validate(3),
            Err(DatasetError::InvalidPlace { index: 3, .. })
        ));

        let nan_lon = PlaceInput { lon: f64::NAN, ..ok.clone() };
        assert!(nan_lon.validate(0).is_err());

        let blank = PlaceInput { name: "  ".to_string(), ..ok.clone() };
        assert!(blank.validate(0).is_err());

        assert!(validate_all(&[ok.clone(), ok.clone(), bad_lat]).is_err());
        assert!(validate_all(&[ok.clone(), ok]).is_ok());
    }

    #[test]
    fn test_read_csv() {
        let places = read_places_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].address.as_deref(), Some("Kovalam, Kerala"));
        assert_eq!(places[0].activity_type.as_deref(), Some("beach"));

        let veli = places[1].clone().into_place();
        assert_eq!(veli.activity_type, "general");
        assert_eq!(veli.place_type, "unknown");
    }

    #[test]
    fn test_read_csv_rejects_bad_rows() {
        let data = "name,lat,lon\nNowhere,100.0,0.0\n";
        assert!(matches!(
            read_places_csv(data.as_bytes()),
            Err(DatasetError::InvalidPlace { index: 0, .. })
        ));

        let data = "name,lat,lon\nNowhere,north,0.0\n";
        assert!(matches!(read_places_csv(data.as_bytes()), Err(DatasetError::Csv(_))));
    }

    #[test]
    fn test_load_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.csv.gz");

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let places = load_places_csv(&path).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Kovalam Beach");
    }

    #[test]
    fn test_missing_file() {
        let err = load_places_csv(Path::new("/nonexistent/places.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Open { .. }));
    }
}
