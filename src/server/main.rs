//! HTTP API server.
//!
//! Serves weather reports, location search, activity place search and LLM
//! advice. Activity places are answered from the in-memory search engine
//! first and from Nominatim when the local index is too thin.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use weatherwise::config::{Config, SearchConfig};
use weatherwise::dataset::load_places_csv;
use weatherwise::search::{builtin_places, ActivitySearchEngine, SearchStats, SharedSearchEngine};
use weatherwise::upstream::{build_http_client, GroqClient, NominatimClient, OpenMeteoClient, UpstreamError};
use weatherwise::ResponseCache;

mod places;
mod weather;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const FREE_APIS_USED: &str = "open-meteo, openstreetmap-nominatim";

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "WeatherWise API server")]
struct Args {
    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra places to load at startup (CSV, optionally gzipped)
    #[arg(long)]
    places_file: Option<PathBuf>,

    /// Do not load the built-in places
    #[arg(long)]
    no_seed: bool,
}

/// Application state shared across handlers
pub struct AppState {
    pub engine: SharedSearchEngine,
    pub open_meteo: OpenMeteoClient,
    pub nominatim: NominatimClient,
    pub groq: GroqClient,
    pub cache: ResponseCache,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, engine: ActivitySearchEngine) -> Result<Self> {
        let http = build_http_client(&config.upstream.user_agent)
            .context("Failed to build HTTP client")?;

        Ok(Self {
            engine: SharedSearchEngine::new(engine),
            open_meteo: OpenMeteoClient::new(http.clone(), &config.upstream),
            nominatim: NominatimClient::new(http.clone(), &config.upstream),
            groq: GroqClient::new(http, &config.upstream),
            cache: ResponseCache::new(config.cache.ttl()),
            config,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(places_file) = args.places_file {
        config.search.places_file = Some(places_file);
    }
    if args.no_seed {
        config.search.seed_builtin = false;
    }

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("WeatherWise API Server");

    let engine = build_engine(&config.search)?;
    info!("Search engine ready with {} places", engine.len());

    if config.upstream.groq_api_key.is_none() {
        warn!("GROQ_API_KEY is not set, advice endpoints will fail");
    }

    let listen = config.server.listen.clone();
    let state = Arc::new(AppState::new(config, engine)?);
    let app = router(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_engine(search: &SearchConfig) -> Result<ActivitySearchEngine> {
    let mut engine = ActivitySearchEngine::new();

    if search.seed_builtin {
        let seeded = engine.insert_many(builtin_places());
        info!("Loaded {} built-in places", seeded);
    }

    if let Some(path) = &search.places_file {
        let places = load_places_csv(path)
            .with_context(|| format!("Failed to load places from {}", path.display()))?;
        let loaded = engine.insert_many(places.into_iter().map(|p| p.into_place()));
        info!("Loaded {} places from {}", loaded, path.display());
    }

    Ok(engine)
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/location/search", post(weather::location_search_handler))
        .route("/api/weather/fetch", post(weather::weather_fetch_handler))
        .route("/api/analyze", post(weather::analyze_handler))
        .route("/api/forecast-insights", post(weather::forecast_insights_handler))
        .route("/api/activity/places", post(places::activity_places_handler))
        .route("/api/places/search", post(places::places_search_handler))
        .route("/api/places/bulk-load", post(places::bulk_load_handler))
        .route("/api/search/stats", get(stats_handler))
        .route("/api/cache/clear", get(cache_clear_handler))
        .route("/api/debug/request-format", post(debug_request_handler))
        .layer(middleware::from_fn_with_state(state.clone(), track_process_time))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Adds `X-Process-Time` (seconds) and warns about slow requests
async fn track_process_time(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let mut response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    if let Ok(value) = HeaderValue::from_str(&format!("{:.4}", elapsed)) {
        response.headers_mut().insert("x-process-time", value);
    }
    if elapsed > state.config.server.slow_request_secs {
        warn!("Slow request: {} {} took {:.2}s", method, path, elapsed);
    }

    response
}

/// Map an upstream failure to the status the client sees
pub(crate) fn upstream_error_response(error: UpstreamError) -> (StatusCode, String) {
    match &error {
        UpstreamError::MissingApiKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "API key not configured".to_string(),
        ),
        UpstreamError::Status { status, .. } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            error.to_string(),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    }
}

#[derive(Serialize)]
struct RootResponse {
    status: &'static str,
    message: &'static str,
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        message: "WeatherWise API is running",
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    groq_api_configured: bool,
    free_apis_used: &'static str,
    search_engine_stats: EngineSummary,
}

#[derive(Serialize)]
struct EngineSummary {
    total_places: usize,
    cache_size: usize,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        groq_api_configured: state.groq.is_configured(),
        free_apis_used: FREE_APIS_USED,
        search_engine_stats: EngineSummary {
            total_places: state.engine.len(),
            cache_size: state.cache.len(),
        },
    })
}

#[derive(Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    stats: SearchStats,
    cache_size: usize,
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        stats: state.engine.stats(),
        cache_size: state.cache.len(),
    })
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

async fn cache_clear_handler(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let removed = state.cache.clear();
    info!("Cleared {} cached responses", removed);
    Json(MessageResponse {
        message: format!("Cache cleared, removed {} entries", removed),
    })
}

#[derive(Serialize)]
struct DebugResponse {
    received_data: Value,
    message: &'static str,
}

/// Echo whatever JSON the client sent
async fn debug_request_handler(Json(body): Json<Value>) -> Json<DebugResponse> {
    info!("Debug request body: {}", body);
    Json(DebugResponse {
        received_data: body,
        message: "Check server logs for request details",
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use weatherwise::config::UpstreamConfig;

    /// State whose upstreams all point at `base_url`
    pub fn state_with(base_url: &str, engine: ActivitySearchEngine) -> Arc<AppState> {
        let mut config = Config::default();
        config.upstream = UpstreamConfig::with_base_url(base_url);
        config.search.term_delay_ms = 0;
        Arc::new(AppState::new(config, engine).unwrap())
    }
}
