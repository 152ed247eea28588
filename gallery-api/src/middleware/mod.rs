//! Middleware for the gallery API.
//!
//! - `auth`: admin session verification for `/api/admin/*`

mod auth;

pub use auth::{admin_auth_middleware, AdminExtractor, AuthMiddlewareError, AuthMiddlewareState};
