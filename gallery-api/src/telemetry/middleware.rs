//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in a tracing span and records Prometheus metrics
//! labelled by the matched route, so slugs and ids never become labels.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::metrics;

/// Route label for requests that matched no route.
const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %route,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Some(metrics) = metrics() {
        metrics.record_http_request(
            method.as_str(),
            &route,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    tracing::info!(
        method = %method,
        path = %path,
        route = %route,
        status = status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/api/paintings/:slug", get(|| async { "ok" }))
            .layer(middleware::from_fn(observability_middleware))
    }

    #[tokio::test]
    async fn test_matched_route_is_recorded() -> Result<(), String> {
        let metrics = metrics().ok_or("metrics not registered")?;
        let before = metrics
            .http_requests_total
            .with_label_values(&["GET", "/api/paintings/:slug", "200"])
            .get();

        let request = Request::builder()
            .uri("/api/paintings/blue-hour")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app().oneshot(request).await.map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);

        let after = metrics
            .http_requests_total
            .with_label_values(&["GET", "/api/paintings/:slug", "200"])
            .get();
        assert!(after >= before + 1.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unmatched_request_passes_through() -> Result<(), String> {
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app().oneshot(request).await.map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
