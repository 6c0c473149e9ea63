//! Open-Meteo forecast and geocoding.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{check_status, UpstreamError};
use crate::config::UpstreamConfig;
use crate::locations::{country_flag, Location};
use crate::weather::{ForecastResponse, CURRENT_VARIABLES, DAILY_VARIABLES, HOURLY_VARIABLES};

const SERVICE: &str = "Open-Meteo";
const FORECAST_TIMEOUT: Duration = Duration::from_secs(10);
const GEOCODING_TIMEOUT: Duration = Duration::from_secs(5);
const GEOCODING_RESULT_COUNT: &str = "10";

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    country: Option<String>,
    country_code: Option<String>,
    admin1: Option<String>,
}

impl GeocodingResult {
    fn into_location(self) -> Location {
        Location {
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            country: self.country.unwrap_or_else(|| "Unknown".to_string()),
            region: None,
            state: Some(self.admin1.unwrap_or_default()),
            lat: self.latitude.unwrap_or(0.0),
            lon: self.longitude.unwrap_or(0.0),
            emoji: country_flag(self.country_code.as_deref().unwrap_or("")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteoClient {
    pub fn new(client: Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            forecast_url: config.open_meteo_forecast_url.clone(),
            geocoding_url: config.open_meteo_geocoding_url.clone(),
        }
    }

    /// Current, hourly and 7-day forecast in local time
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, UpstreamError> {
        let url = Url::parse_with_params(
            &self.forecast_url,
            &[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current", CURRENT_VARIABLES.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("daily", DAILY_VARIABLES.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", "7".to_string()),
            ],
        )?;

        debug!("Fetching forecast for ({}, {})", lat, lon);
        let response = self
            .client
            .get(url)
            .timeout(FORECAST_TIMEOUT)
            .send()
            .await?;
        let response = check_status(SERVICE, response)?;

        Ok(response.json::<ForecastResponse>().await?)
    }

    /// Place-name search
    pub async fn geocode(&self, name: &str) -> Result<Vec<Location>, UpstreamError> {
        let url = Url::parse_with_params(
            &self.geocoding_url,
            &[
                ("name", name),
                ("count", GEOCODING_RESULT_COUNT),
                ("language", "en"),
                ("format", "json"),
            ],
        )?;

        let response = self
            .client
            .get(url)
            .timeout(GEOCODING_TIMEOUT)
            .send()
            .await?;
        let response = check_status(SERVICE, response)?;
        let body: GeocodingResponse = response.json().await?;

        Ok(body
            .results
            .into_iter()
            .map(GeocodingResult::into_location)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::build_http_client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> OpenMeteoClient {
        let config = UpstreamConfig::with_base_url(&server.uri());
        OpenMeteoClient::new(build_http_client("test").unwrap(), &config)
    }

    #[tokio::test]
    async fn test_geocode_maps_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Kochi"))
            .and(query_param("count", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {
                        "name": "Kochi",
                        "latitude": 9.93988,
                        "longitude": 76.26022,
                        "country": "India",
                        "country_code": "IN",
                        "admin1": "Kerala"
                    },
                    { "name": "Kōchi", "latitude": 33.55, "longitude": 133.53 }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let locations = client.geocode("Kochi").await.unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].state.as_deref(), Some("Kerala"));
        assert_eq!(locations[0].emoji, "🇮🇳");
        assert_eq!(locations[1].country, "Unknown");
        assert_eq!(locations[1].emoji, "📍");
    }

    #[tokio::test]
    async fn test_geocode_without_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generationtime_ms": 0.5
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert!(client.geocode("zzzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forecast_request_and_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("timezone", "auto"))
            .and(query_param("forecast_days", "7"))
            .and(query_param("latitude", "9.9312"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "utc_offset_seconds": 19800,
                "current": { "temperature_2m": 29.5, "weather_code": 3 }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let forecast = client.forecast(9.9312, 76.2673).await.unwrap();
        assert_eq!(forecast.current.temperature_2m, Some(29.5));
        assert_eq!(forecast.current.weather_code, Some(3));
        assert!(forecast.daily.time.is_empty());

        let err = client.forecast(1.0, 2.0).await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(404));
    }
}
