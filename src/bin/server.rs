use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bitebridge_engine::{
    error::MarketError, AdvertFilter, MarketConfig, Marketplace, ScoredAdvert, SearchQuery,
    SearchResponse, SortOrder, VendorStats,
};

#[derive(Clone)]
struct AppState {
    market: Arc<Marketplace>,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    filter: AdvertFilter,
    #[serde(default)]
    sort: SortOrder,
    #[serde(default = "default_max_results")]
    max_results: usize,
}

fn default_max_results() -> usize { 20 }

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RecommendationResponse {
    advert_id: String,
    recommendations: Vec<ScoredAdvert>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitebridge_server=debug,bitebridge_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("BITEBRIDGE_CONFIG") {
        Ok(path) => MarketConfig::load(path)?,
        Err(_) => MarketConfig::from_env(),
    };

    tracing::info!("🚀 Starting BiteBridge advert engine");
    tracing::info!("📦 Database: {}", config.db_path);
    tracing::info!("🔌 Port: {}", config.port);

    let market = Marketplace::from_config(&config).await?;

    let state = AppState {
        market: Arc::new(market),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/search", post(search_handler))
        .route("/v1/adverts/:id/recommendations", get(recommendations_handler))
        .route("/v1/vendors/:owner_id/stats", get(vendor_stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("🍲 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: bitebridge_engine::VERSION.to_string(),
    })
}

async fn search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    tracing::debug!("Search request: {:?}", req);

    let query = SearchQuery {
        query: req.query.clone(),
        filter: req.filter,
        sort: req.sort,
        limit: Some(req.max_results),
    };

    let result = state.market.search(query).await?;

    tracing::info!(
        "✅ '{}' → {}/{} adverts from {} ({:.1}ms)",
        req.query,
        result.matched,
        result.total,
        result.provider,
        result.latency_ms
    );

    Ok(Json(result))
}

async fn recommendations_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let recommendations = state.market.recommendations(&id, params.limit).await?;

    Ok(Json(RecommendationResponse {
        advert_id: id,
        recommendations,
    }))
}

async fn vendor_stats_handler(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Json<VendorStats>, AppError> {
    let stats = state.market.vendor_stats(&owner_id).await?;
    Ok(Json(stats))
}

// Error handling
struct AppError(MarketError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            MarketError::Validation(message) => {
                (StatusCode::BAD_REQUEST, format!("Invalid advert: {}", message))
            }
            MarketError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Advert not found: {}", id))
            }
            MarketError::Provider { provider, message } => {
                (StatusCode::BAD_GATEWAY, format!("Provider '{}' error: {}", provider, message))
            }
            e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        tracing::error!("❌ Error: {} - {}", status, message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<MarketError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
