//! API Routes
//!
//! Configures the Axum router with the cache and grid endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, delete_handler, get_handler, grid_export_handler, grid_view_handler,
    health_handler, invalidate_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `PUT /cache` - Store a JSON value
/// - `GET /cache/:key` - Retrieve a value
/// - `DELETE /cache/:key` - Delete a key
/// - `POST /cache/invalidate` - Delete keys matching a pattern
/// - `POST /cache/cleanup` - Run a sweep now
/// - `GET /cache/stats` - Cache statistics
/// - `POST /grid/view` - Filter, sort and paginate rows
/// - `POST /grid/export` - Export rows as CSV, HTML or XLSX
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache", put(set_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache/cleanup", post(cleanup_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/grid/view", post(grid_view_handler))
        .route("/grid/export", post(grid_export_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, SharedCache};
    use crate::config::CacheConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = SharedCache::new(CacheStore::new(CacheConfig::default()).unwrap());
        create_router(AppState::new(cache))
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
    async fn test_stats_route_is_not_a_key_lookup() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/cache/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
