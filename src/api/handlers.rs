//! API Handlers
//!
//! HTTP request handlers for each diagnostics endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    AllStatsResponse, CleanupResponse, ClearResponse, DeleteResponse, HealthResponse,
    InvalidateRequest, InvalidateResponse, KeysResponse, StatsResponse,
};
use crate::registry::{CacheRegistry, Namespace};

/// Application state shared across all handlers.
///
/// The registry is internally shared, so cloning the state is cheap.
#[derive(Clone)]
pub struct AppState {
    pub registry: CacheRegistry,
}

impl AppState {
    pub fn new(registry: CacheRegistry) -> Self {
        Self { registry }
    }

    /// Builds the registry from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(CacheRegistry::new(&config.caches)?))
    }
}

/// Handler for GET /stats
pub async fn all_stats_handler(State(state): State<AppState>) -> Json<AllStatsResponse> {
    Json(AllStatsResponse::new(state.registry.all_stats()))
}

/// Handler for GET /stats/:namespace
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<StatsResponse>> {
    let namespace: Namespace = namespace.parse()?;
    Ok(Json(StatsResponse::new(state.registry.stats(namespace))))
}

/// Handler for GET /keys/:namespace
pub async fn keys_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<KeysResponse>> {
    let namespace: Namespace = namespace.parse()?;
    Ok(Json(KeysResponse::new(
        namespace,
        state.registry.keys(namespace),
    )))
}

/// Handler for DELETE /keys/:namespace/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let namespace: Namespace = namespace.parse()?;
    if !state.registry.remove(namespace, &key) {
        return Err(CacheError::NotFound(key));
    }
    Ok(Json(DeleteResponse::new(namespace, key)))
}

/// Handler for POST /invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.registry.invalidate_by_pattern(&req.pattern);
    Ok(Json(InvalidateResponse {
        pattern: req.pattern,
        removed,
    }))
}

/// Handler for POST /cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let report = state.registry.cleanup_all();
    info!(removed = report.total(), "manual cleanup requested");
    Json(CleanupResponse::new(report))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.registry.clear_all();
    Json(ClearResponse {
        message: "All caches cleared".to_string(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
