//! Prometheus Metrics Definitions
//!
//! Defines the gallery metrics and exposes a /metrics endpoint for scraping.

use axum::{http::StatusCode, response::IntoResponse};
use gallery_storage::CatalogRead;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<GalleryMetrics>> = Lazy::new(GalleryMetrics::new);

/// The registered metrics, or `None` if registration failed.
pub fn metrics() -> Option<&'static GalleryMetrics> {
    METRICS.as_ref().ok()
}

/// Container for all gallery metrics.
#[derive(Clone)]
pub struct GalleryMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Public catalog reads - labels: outcome (fresh/stale/unavailable), source (cache/store)
    pub catalog_reads_total: CounterVec,

    /// Admin writes - labels: operation, status
    pub admin_writes_total: CounterVec,

    /// Image uploads - labels: backend, status
    pub image_uploads_total: CounterVec,

    /// Inquiry redirects - labels: result (see [`InquiryResult`])
    pub inquiries_total: CounterVec,
}

/// Label values for `gallery_inquiries_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryResult {
    Redirected,
    /// Painting is sold or not for sale.
    Rejected,
    NotFound,
}

impl InquiryResult {
    pub const ALL: [InquiryResult; 3] = [
        InquiryResult::Redirected,
        InquiryResult::Rejected,
        InquiryResult::NotFound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InquiryResult::Redirected => "redirected",
            InquiryResult::Rejected => "rejected",
            InquiryResult::NotFound => "not_found",
        }
    }
}

fn registration_error(name: &str, e: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, e))
}

impl GalleryMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "gallery_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "gallery_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            catalog_reads_total: register_counter_vec!(
                "gallery_catalog_reads_total",
                "Public catalog reads by outcome and source",
                &["outcome", "source"]
            )
            .map_err(|e| registration_error("catalog_reads_total", e))?,

            admin_writes_total: register_counter_vec!(
                "gallery_admin_writes_total",
                "Admin create/update/delete operations",
                &["operation", "status"]
            )
            .map_err(|e| registration_error("admin_writes_total", e))?,

            image_uploads_total: register_counter_vec!(
                "gallery_image_uploads_total",
                "Image uploads to object storage",
                &["backend", "status"]
            )
            .map_err(|e| registration_error("image_uploads_total", e))?,

            inquiries_total: register_counter_vec!(
                "gallery_inquiries_total",
                "Purchase inquiry redirects",
                &["result"]
            )
            .map_err(|e| registration_error("inquiries_total", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record how a catalog read was satisfied.
    pub fn record_catalog_read(&self, read: &CatalogRead) {
        let source = if read.was_cache_hit() { "cache" } else { "store" };
        self.catalog_reads_total
            .with_label_values(&[read.outcome().as_str(), source])
            .inc();
    }

    pub fn record_admin_write(&self, operation: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        self.admin_writes_total
            .with_label_values(&[operation, status])
            .inc();
    }

    pub fn record_image_upload(&self, backend: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        self.image_uploads_total
            .with_label_values(&[backend, status])
            .inc();
    }

    pub fn record_inquiry(&self, result: InquiryResult) {
        self.inquiries_total
            .with_label_values(&[result.as_str()])
            .inc();
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
