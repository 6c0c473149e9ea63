//! Location search, weather report and LLM advice handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use weatherwise::advice::{
    activity_prompt, forecast_prompt, ActivityAdviceRequest, ForecastInsightRequest,
    ACTIVITY_ADVICE_MAX_TOKENS, FORECAST_INSIGHT_MAX_TOKENS,
};
use weatherwise::locations::{search_local, Location};
use weatherwise::upstream::{geocode_location, UpstreamError};
use weatherwise::weather::{build_report, ForecastResponse, WeatherReport};

use crate::{upstream_error_response, AppState};

#[derive(Debug, Deserialize)]
pub struct LocationSearchRequest {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize)]
pub struct LocationSearchResponse {
    locations: Vec<Location>,
}

/// Built-in directory first, then cached external geocoding
pub async fn location_search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LocationSearchRequest>,
) -> Json<LocationSearchResponse> {
    let query = request.query.trim();
    if query.chars().count() < 2 {
        return Json(LocationSearchResponse { locations: vec![] });
    }

    let local = search_local(query);
    if !local.is_empty() {
        info!("Found {} local results for '{}'", local.len(), query);
        return Json(LocationSearchResponse { locations: local });
    }

    let cache_key = format!("geocode:{}", query.to_lowercase());
    if let Some(cached) = state.cache.get(&cache_key) {
        match serde_json::from_value::<Vec<Location>>(cached) {
            Ok(locations) => return Json(LocationSearchResponse { locations }),
            Err(e) => warn!("Discarding unreadable cache entry {}: {}", cache_key, e),
        }
    }

    let locations = geocode_location(&state.open_meteo, &state.nominatim, query).await;
    if !locations.is_empty() {
        match serde_json::to_value(&locations) {
            Ok(value) => state.cache.insert(cache_key, value),
            Err(e) => warn!("Failed to cache geocoding results: {}", e),
        }
    }

    Json(LocationSearchResponse { locations })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationWeatherRequest {
    lat: f64,
    lon: f64,
    location_name: String,
    #[serde(default)]
    location_country: Option<String>,
}

async fn cached_forecast(state: &AppState, lat: f64, lon: f64) -> Result<ForecastResponse, UpstreamError> {
    let cache_key = format!("forecast:{:.4},{:.4}", lat, lon);
    if let Some(cached) = state.cache.get(&cache_key) {
        if let Ok(forecast) = serde_json::from_value(cached) {
            return Ok(forecast);
        }
    }

    let forecast = state.open_meteo.forecast(lat, lon).await?;
    if let Ok(value) = serde_json::to_value(&forecast) {
        state.cache.insert(cache_key, value);
    }
    Ok(forecast)
}

pub async fn weather_fetch_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LocationWeatherRequest>,
) -> Result<Json<WeatherReport>, (StatusCode, String)> {
    info!(
        "Fetching weather for: {}, {} ({}, {})",
        request.location_name,
        request.location_country.as_deref().unwrap_or("-"),
        request.lat,
        request.lon
    );

    let forecast = cached_forecast(&state, request.lat, request.lon)
        .await
        .map_err(|e| {
            error!("Weather fetch failed: {}", e);
            upstream_error_response(e)
        })?;

    Ok(Json(build_report(&forecast, request.lat, Utc::now())))
}

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    advice: String,
}

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityAdviceRequest>,
) -> Result<Json<AdviceResponse>, (StatusCode, String)> {
    info!(
        "Activity advice for {} in {}",
        request.activity_name, request.location_name
    );

    let advice = state
        .groq
        .complete(&activity_prompt(&request), ACTIVITY_ADVICE_MAX_TOKENS)
        .await
        .map_err(|e| {
            error!("Activity advice failed: {}", e);
            upstream_error_response(e)
        })?;

    Ok(Json(AdviceResponse { advice }))
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    insights: String,
}

pub async fn forecast_insights_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastInsightRequest>,
) -> Result<Json<InsightsResponse>, (StatusCode, String)> {
    info!("Forecast insights for {}", request.location_name);

    let insights = state
        .groq
        .complete(&forecast_prompt(&request), FORECAST_INSIGHT_MAX_TOKENS)
        .await
        .map_err(|e| {
            error!("Forecast insights failed: {}", e);
            upstream_error_response(e)
        })?;

    Ok(Json(InsightsResponse { insights }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::state_with;
    use weatherwise::search::ActivitySearchEngine;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn location_request(query: &str) -> Json<LocationSearchRequest> {
        Json(LocationSearchRequest {
            query: query.to_string(),
        })
    }

    #[tokio::test]
    async fn test_location_search_local_and_short() {
        let state = state_with("http://127.0.0.1:9", ActivitySearchEngine::new());

        let Json(short) = location_search_handler(State(state.clone()), location_request(" k ")).await;
        assert!(short.locations.is_empty());

        let Json(local) = location_search_handler(State(state), location_request("munnar")).await;
        assert_eq!(local.locations[0].name, "Munnar");
    }

    #[tokio::test]
    async fn test_location_search_caches_external_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{ "name": "Reykjavik", "latitude": 64.1, "longitude": -21.9, "country_code": "IS" }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let state = state_with(&mock_server.uri(), ActivitySearchEngine::new());
        for _ in 0..2 {
            let Json(found) =
                location_search_handler(State(state.clone()), location_request("Reykjavik")).await;
            assert_eq!(found.locations.len(), 1);
            assert_eq!(found.locations[0].emoji, "🇮🇸");
        }
        assert_eq!(state.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_weather_fetch_maps_upstream_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let state = state_with(&mock_server.uri(), ActivitySearchEngine::new());
        let request = LocationWeatherRequest {
            lat: 9.9312,
            lon: 76.2673,
            location_name: "Kochi".to_string(),
            location_country: None,
        };

        let err = weather_fetch_handler(State(state), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_weather_fetch_builds_report() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "utc_offset_seconds": 0,
                "current": { "temperature_2m": 30.0, "weather_code": 61, "uv_index": 7.0 },
                "daily": {
                    "time": ["2024-06-01"],
                    "weather_code": [3],
                    "temperature_2m_max": [32.0],
                    "temperature_2m_min": [24.0],
                    "precipitation_sum": [12.5],
                    "wind_speed_10m_max": [20.0]
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let state = state_with(&mock_server.uri(), ActivitySearchEngine::new());
        for _ in 0..2 {
            let request = LocationWeatherRequest {
                lat: 9.9312,
                lon: 76.2673,
                location_name: "Kochi".to_string(),
                location_country: Some("India".to_string()),
            };
            let Json(report) = weather_fetch_handler(State(state.clone()), Json(request))
                .await
                .unwrap();
            assert_eq!(report.current.temperature, 86.0);
            assert_eq!(report.current.uv_index, 7.0);
            assert_eq!(report.forecast.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_analyze_without_key() {
        let state = state_with("http://127.0.0.1:9", ActivitySearchEngine::new());
        let request = ActivityAdviceRequest {
            temperature: 75.0,
            wind_speed: 8.0,
            precipitation: 0.0,
            humidity: 60.0,
            uv_index: 6.0,
            activity_name: "Beach".to_string(),
            location_name: "Kochi".to_string(),
            location_country: "India".to_string(),
        };

        let (status, message) = analyze_handler(State(state), Json(request))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "API key not configured");
    }
}
