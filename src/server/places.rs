//! Activity place handlers: hybrid search, external lookup and bulk load.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use weatherwise::dataset::{validate_all, PlaceInput};
use weatherwise::search::{is_valid_coordinate, merge_unique, PlaceView, DEFAULT_LIMIT};
use weatherwise::upstream::{discover_activity_places, find_activity_places};

use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPlacesRequest {
    lat: f64,
    lon: f64,
    activity: String,
    location_name: String,
}

#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    places: Vec<PlaceView>,
}

/// Direct external lookup, one search per activity term
pub async fn activity_places_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityPlacesRequest>,
) -> Json<PlacesResponse> {
    let places = find_activity_places(
        &state.nominatim,
        request.lat,
        request.lon,
        &request.activity,
        &request.location_name,
    )
    .await;

    Json(PlacesResponse {
        places: places.iter().map(PlaceView::from).collect(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSearchRequest {
    lat: f64,
    lon: f64,
    #[serde(default)]
    activity: String,
    #[serde(default)]
    location_name: String,
}

#[derive(Debug, Serialize)]
pub struct PlaceSearchResponse {
    places: Vec<PlaceView>,
    source: &'static str,
    local_results: usize,
    api_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Local engine first; external discovery when it has too few results
pub async fn places_search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceSearchRequest>,
) -> Result<Json<PlaceSearchResponse>, (StatusCode, String)> {
    if request.activity.trim().is_empty() || request.location_name.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Activity and locationName are required".to_string(),
        ));
    }
    if !is_valid_coordinate(request.lat, request.lon) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Invalid coordinates: {}, {}", request.lat, request.lon),
        ));
    }

    info!(
        "Hybrid search for {} places in {} at {}, {}",
        request.activity, request.location_name, request.lat, request.lon
    );

    let local: Vec<PlaceView> = state
        .engine
        .search_nearby(request.lat, request.lon, &request.activity, DEFAULT_LIMIT)
        .iter()
        .map(PlaceView::from)
        .collect();
    let local_results = local.len();

    if local_results >= state.config.search.local_result_threshold {
        info!("Returning {} local results", local_results);
        return Ok(Json(PlaceSearchResponse {
            places: local,
            source: "local_cache",
            local_results,
            api_results: 0,
            error: None,
        }));
    }

    // Discovered places are indexed even if the client goes away mid-request
    let task_state = state.clone();
    let discovery = tokio::spawn(async move {
        let term_delay = Duration::from_millis(task_state.config.search.term_delay_ms);
        let found = discover_activity_places(
            &task_state.nominatim,
            request.lat,
            request.lon,
            &request.activity,
            &request.location_name,
            term_delay,
        )
        .await;
        task_state.engine.insert_many(found.iter().cloned());
        found
    });

    let discovered = match discovery.await {
        Ok(found) => found,
        Err(e) => {
            error!("External place search failed: {}", e);
            return Ok(Json(PlaceSearchResponse {
                places: vec![],
                source: "error",
                local_results: 0,
                api_results: 0,
                error: Some(e.to_string()),
            }));
        }
    };

    let api_results = discovered.len();
    let places = merge_unique(
        local.into_iter().chain(discovered.iter().map(PlaceView::from)),
        DEFAULT_LIMIT,
    );
    info!("Total unique places found: {}", places.len());

    Ok(Json(PlaceSearchResponse {
        places,
        source: "hybrid",
        local_results,
        api_results,
        error: None,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BulkLoadRequest {
    places: Vec<PlaceInput>,
}

#[derive(Debug, Serialize)]
pub struct BulkLoadResponse {
    message: String,
    status: &'static str,
    total_places: usize,
}

/// Validate the whole batch, then index it
pub async fn bulk_load_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkLoadRequest>,
) -> Result<Json<BulkLoadResponse>, (StatusCode, String)> {
    validate_all(&request.places).map_err(|e| {
        error!("Rejected bulk load: {}", e);
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    let loaded = state
        .engine
        .insert_many(request.places.into_iter().map(PlaceInput::into_place));
    let total_places = state.engine.len();
    info!("Bulk loaded {} places ({} total)", loaded, total_places);

    Ok(Json(BulkLoadResponse {
        message: format!("Successfully loaded {} places", loaded),
        status: "success",
        total_places,
    }))
}
