//! Gallery Telemetry - Logging and Metrics
//!
//! Structured logging through `tracing-subscriber` and Prometheus metrics
//! for HTTP traffic, catalog reads and admin writes.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics, metrics_handler, GalleryMetrics, InquiryResult, METRICS};
pub use middleware::observability_middleware;
pub use tracer::{init_tracer, LogFormat, TelemetryConfig};
