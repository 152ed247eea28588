//! Gallery API - HTTP Layer for the Painting Catalog
//!
//! Axum routes for the public catalog, the purchase inquiry redirect and the
//! admin API, plus the Postgres store, session auth, configuration and
//! telemetry that back them.
//!
//! Public pages read through the process-wide [`gallery_storage::CatalogCache`];
//! admin writes go straight to the store.

#[macro_use]
pub mod macros;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use auth::{
    authenticate_admin, hash_password, issue_session_token, validate_session_token,
    verify_password, AdminSession, AuthConfig, Claims,
};
pub use config::{GalleryConfig, StorageBackend, StorageConfig};
pub use db::{DbConfig, PgStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{admin_auth_middleware, AdminExtractor, AuthMiddlewareState};
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
pub use types::*;
