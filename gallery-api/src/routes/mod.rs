//! REST API Routes Module
//!
//! - Public catalog under /api (home, listing, detail)
//! - Purchase inquiry redirect at /inquire/{slug}
//! - Admin API under /api/admin (session required except for login)
//! - Health checks at /health/* and metrics at /metrics
//! - Uploaded images at /media when stored on the local filesystem

pub mod admin;
pub mod catalog;
pub mod health;
pub mod inquiry;

use std::path::Path;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;

use crate::config::GalleryConfig;
use crate::middleware::{admin_auth_middleware, AuthMiddlewareState};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use admin::{protected_router as admin_protected_router, public_router as admin_public_router};
pub use catalog::create_router as catalog_router;
pub use health::create_router as health_router;
pub use inquiry::create_router as inquiry_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the complete application router.
///
/// `media_root` is served under `/media` when images are stored locally.
///
/// # Middleware Order (outer to inner)
/// 1. CORS - handles preflight requests
/// 2. Observability - tracing and metrics
/// 3. Body limit - caps multipart uploads
/// 4. Auth (only on /api/admin/* except login)
pub fn create_router(state: AppState, media_root: Option<&Path>) -> Router {
    let admin_routes = admin::protected_router().layer(from_fn_with_state(
        AuthMiddlewareState::new(state.auth.clone()),
        admin_auth_middleware,
    ));

    let api_routes = catalog::create_router().nest(
        "/admin",
        admin::public_router().merge(admin_routes),
    );

    let mut router = Router::new()
        .nest("/api", api_routes)
        .merge(inquiry::create_router())
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json));

    if let Some(root) = media_root {
        tracing::info!(root = %root.display(), "Serving uploaded images under /media");
        router = router.nest_service("/media", ServeDir::new(root));
    }

    let cors = build_cors_layer(&state.config);
    let body_limit = state.config.max_upload_bytes;

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(observability_middleware))
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from GalleryConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &GalleryConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let config = config.clone();
        cors.allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin
                    .to_str()
                    .map(|o| config.is_origin_allowed(o))
                    .unwrap_or(false)
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/paintings")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    }

    fn cors_app(origins: Vec<String>) -> Router {
        let config = GalleryConfig {
            cors_origins: origins,
            ..GalleryConfig::default()
        };
        Router::new()
            .route("/api/paintings", get(|| async { "ok" }))
            .layer(build_cors_layer(&config))
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = cors_app(vec!["https://gallery.example".to_string()]);
        let response = app.oneshot(preflight("https://gallery.example")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("https://gallery.example"))
        );
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let app = cors_app(vec!["https://gallery.example".to_string()]);
        let response = app.oneshot(preflight("https://evil.example")).await.unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_development_allows_any() {
        let app = cors_app(Vec::new());
        let response = app.oneshot(preflight("http://localhost:5173")).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );
    }
}
