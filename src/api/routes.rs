//! API Routes
//!
//! Configures the Axum router with all diagnostics endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    all_stats_handler, cleanup_handler, clear_handler, delete_handler, health_handler,
    invalidate_handler, keys_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /stats` - Stats for every namespace
/// - `GET /stats/:namespace` - Stats for one namespace
/// - `GET /keys/:namespace` - Keys held by one namespace
/// - `DELETE /keys/:namespace/:key` - Delete one key
/// - `POST /invalidate` - Delete keys containing a pattern
/// - `POST /cleanup` - Sweep expired entries now
/// - `DELETE /clear` - Empty every namespace
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(all_stats_handler))
        .route("/stats/:namespace", get(stats_handler))
        .route("/keys/:namespace", get(keys_handler))
        .route("/keys/:namespace/:key", delete(delete_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/clear", delete(clear_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::registry::CacheRegistry;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let registry = CacheRegistry::new(&RegistryConfig::default()).unwrap();
        create_router(AppState::new(registry))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_namespace_is_bad_request() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/keys/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_missing_key() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/keys/api/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
