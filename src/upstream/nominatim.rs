//! OpenStreetMap Nominatim free-text search.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{check_status, UpstreamError};
use crate::config::UpstreamConfig;
use crate::locations::{country_flag, Location};

const SERVICE: &str = "Nominatim";
const LOCATION_SEARCH_LIMIT: u32 = 10;
const LOCATION_SEARCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Bounding box in Nominatim's `left,top,right,bottom` (lon/lat) order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl ViewBox {
    /// Square box of `half_size` degrees around a point
    pub fn around(lat: f64, lon: f64, half_size: f64) -> Self {
        Self {
            min_lon: lon - half_size,
            min_lat: lat - half_size,
            max_lon: lon + half_size,
            max_lat: lat + half_size,
        }
    }

    fn to_param(self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[derive(Debug, Clone)]
pub struct NominatimQuery {
    pub q: String,
    pub limit: u32,
    pub address_details: bool,
    /// Results are restricted to the box when set
    pub viewbox: Option<ViewBox>,
    pub timeout: Duration,
}

impl NominatimQuery {
    pub fn new(q: impl Into<String>, limit: u32, timeout: Duration) -> Self {
        Self {
            q: q.into(),
            limit,
            address_details: false,
            viewbox: None,
            timeout,
        }
    }

    pub fn with_address_details(mut self) -> Self {
        self.address_details = true;
        self
    }

    pub fn bounded_to(mut self, viewbox: ViewBox) -> Self {
        self.viewbox = Some(viewbox);
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.q.clone()),
            ("format", "json".to_string()),
            ("limit", self.limit.to_string()),
        ];
        if self.address_details {
            params.push(("addressdetails", "1".to_string()));
        }
        if let Some(viewbox) = self.viewbox {
            params.push(("viewbox", viewbox.to_param()));
            params.push(("bounded", "1".to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimAddress {
    pub country: Option<String>,
    pub state: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    #[serde(default)]
    pub display_name: String,
    /// Decimal degrees as a string
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub address: Option<NominatimAddress>,
}

impl NominatimPlace {
    /// First comma-separated part of the display name
    pub fn primary_name(&self) -> &str {
        self.display_name
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.trim().parse().ok()?;
        let lon = self.lon.trim().parse().ok()?;
        Some((lat, lon))
    }

    fn into_location(self) -> Option<Location> {
        let (lat, lon) = self.coordinates()?;
        let name = match self.primary_name() {
            "" => "Unknown".to_string(),
            name => name.to_string(),
        };
        let address = self.address.unwrap_or_default();
        Some(Location {
            name,
            country: address.country.unwrap_or_else(|| "Unknown".to_string()),
            region: None,
            state: Some(address.state.unwrap_or_default()),
            lat,
            lon,
            emoji: country_flag(address.country_code.as_deref().unwrap_or("")),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    url: String,
}

impl NominatimClient {
    pub fn new(client: Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            url: config.nominatim_url.clone(),
        }
    }

    pub async fn search(&self, query: &NominatimQuery) -> Result<Vec<NominatimPlace>, UpstreamError> {
        let url = Url::parse_with_params(&self.url, &query.params())?;

        let response = self
            .client
            .get(url)
            .timeout(query.timeout)
            .send()
            .await?;
        let response = check_status(SERVICE, response)?;
        let places: Vec<NominatimPlace> = response.json().await?;

        debug!("Nominatim returned {} results for '{}'", places.len(), query.q);
        Ok(places)
    }

    /// Location lookup used when Open-Meteo geocoding has nothing
    pub async fn search_locations(&self, query: &str) -> Result<Vec<Location>, UpstreamError> {
        let query = NominatimQuery::new(query, LOCATION_SEARCH_LIMIT, LOCATION_SEARCH_TIMEOUT)
            .with_address_details();
        let places = self.search(&query).await?;

        Ok(places
            .into_iter()
            .filter_map(NominatimPlace::into_location)
            .collect())
    }
}
