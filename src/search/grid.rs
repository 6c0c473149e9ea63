//! Grid cells, coordinate keys and great-circle distance.

/// Cell edge in degrees (~11 km at the equator)
pub const GRID_SIZE_DEG: f64 = 0.1;

/// Approximate kilometres per grid cell, used to size the sweep
pub const KM_PER_CELL: f64 = 11.0;

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Index of a 0.1° x 0.1° grid cell: (lat cell, lon cell)
pub type GridKey = (i32, i32);

/// Coordinate rounded to 4 decimal places, scaled to integers so it can be hashed.
///
/// Two places with the same `CoordKey` are treated as the same place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey {
    lat_e4: i64,
    lon_e4: i64,
}

impl CoordKey {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat_e4: (lat * 1e4).round() as i64,
            lon_e4: (lon * 1e4).round() as i64,
        }
    }

    /// Rounded latitude in degrees
    pub fn lat(&self) -> f64 {
        self.lat_e4 as f64 / 1e4
    }

    /// Rounded longitude in degrees
    pub fn lon(&self) -> f64 {
        self.lon_e4 as f64 / 1e4
    }
}

/// Grid cell containing a coordinate
pub fn grid_key(lat: f64, lon: f64) -> GridKey {
    (
        (lat / GRID_SIZE_DEG).floor() as i32,
        (lon / GRID_SIZE_DEG).floor() as i32,
    )
}

/// All cells in the square block around the cell containing `(lat, lon)`.
///
/// The block extends `ceil(radius_km / 11)` cells (at least one) in every
/// direction. Cells are yielded latitude-major so candidate order is stable.
pub fn nearby_grids(lat: f64, lon: f64, radius_km: f64) -> Vec<GridKey> {
    let (center_lat, center_lon) = grid_key(lat, lon);
    let range = ((radius_km / KM_PER_CELL).ceil() as i32).max(1);

    let side = 2 * range as usize + 1;
    let mut grids = Vec::with_capacity(side * side);
    for lat_offset in -range..=range {
        for lon_offset in -range..=range {
            // Saturate at the key range for coordinates far off the globe
            grids.push((
                center_lat.saturating_add(lat_offset),
                center_lon.saturating_add(lon_offset),
            ));
        }
    }
    grids
}

/// Latitude in [-90, 90] and longitude in [-180, 180], both finite
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

/// Haversine distance in kilometres
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
