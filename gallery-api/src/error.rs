//! Error Types for the Gallery API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gallery_core::{
    AuthError, ConfigError, GalleryError, NavigationError, ObjectStorageError, StorageError,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Email or password did not match an admin account
    InvalidCredentials,

    /// Session token is invalid or malformed
    InvalidToken,

    /// Session token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400, 413)
    // ========================================================================
    ValidationFailed,
    InvalidInput,
    MissingField,
    InvalidRange,
    InvalidFormat,
    PayloadTooLarge,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    PaintingNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Another painting already uses the slug
    SlugAlreadyExists,

    /// Painting status does not allow the operation
    NotPurchasable,

    // ========================================================================
    // Server Errors (500, 502, 503)
    // ========================================================================
    InternalError,
    DatabaseError,

    /// Image upload to object storage failed
    UploadFailed,

    ServiceUnavailable,
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized
            | ErrorCode::InvalidCredentials
            | ErrorCode::InvalidToken
            | ErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            ErrorCode::PaintingNotFound => StatusCode::NOT_FOUND,

            ErrorCode::SlugAlreadyExists | ErrorCode::NotPurchasable => StatusCode::CONFLICT,

            ErrorCode::UploadFailed => StatusCode::BAD_GATEWAY,

            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::InvalidToken => "Invalid session token",
            ErrorCode::TokenExpired => "Session has expired",

            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidRange => "Value is out of valid range",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::PayloadTooLarge => "Upload exceeds the size limit",

            ErrorCode::PaintingNotFound => "Painting not found",

            ErrorCode::SlugAlreadyExists => "A painting with this slug already exists",
            ErrorCode::NotPurchasable => "Painting is not available for purchase",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::UploadFailed => "Image upload failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::ConnectionPoolExhausted => "Connection pool exhausted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (offending field, limits)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_credentials() -> Self {
        Self::from_code(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error naming the field.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    pub fn invalid_range(field: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("Field '{}' must be between {} and {}", field, min, max),
        )
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    pub fn payload_too_large(limit_bytes: usize) -> Self {
        Self::new(
            ErrorCode::PayloadTooLarge,
            format!("Upload exceeds the {} byte limit", limit_bytes),
        )
        .with_details(serde_json::json!({ "limit_bytes": limit_bytes }))
    }

    /// Map a multipart read failure, quoting `limit_bytes` when the body
    /// limit was hit.
    pub fn from_multipart(err: MultipartError, limit_bytes: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::payload_too_large(limit_bytes);
        }
        ApiError::invalid_input(format!("Malformed multipart body: {}", err.body_text()))
    }

    pub fn painting_not_found(id_or_slug: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::PaintingNotFound,
            format!("Painting {} not found", id_or_slug),
        )
    }

    pub fn slug_already_exists(slug: &str) -> Self {
        Self::new(
            ErrorCode::SlugAlreadyExists,
            format!("A painting with slug '{}' already exists", slug),
        )
    }

    pub fn not_purchasable(title: &str, label: &str) -> Self {
        Self::new(
            ErrorCode::NotPurchasable,
            format!("'{}' cannot be purchased: {}", title, label),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn upload_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UploadFailed, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<GalleryError> for ApiError {
    fn from(err: GalleryError) -> Self {
        match err {
            GalleryError::Storage(e) => e.into(),
            GalleryError::ObjectStorage(e) => e.into(),
            GalleryError::Validation(e) => e.into(),
            GalleryError::Auth(e) => e.into(),
            GalleryError::Navigation(e) => e.into(),
            GalleryError::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                ApiError::internal_error("Server misconfigured")
            }
        }
    }
}

impl From<NavigationError> for ApiError {
    fn from(err: NavigationError) -> Self {
        match err {
            NavigationError::OutOfRange { index, len } => {
                ApiError::invalid_range("image", 0, len.saturating_sub(1))
                    .with_details(serde_json::json!({ "index": index, "len": len }))
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => ApiError::painting_not_found(id),
            StorageError::DuplicateSlug { slug } => ApiError::slug_already_exists(&slug),
            other => {
                // Log the full error, return a generic message.
                tracing::error!("Storage error: {}", other);
                ApiError::database_error("Database operation failed")
            }
        }
    }
}

impl From<ObjectStorageError> for ApiError {
    fn from(err: ObjectStorageError) -> Self {
        tracing::error!("Object storage error: {}", err);
        match err {
            ObjectStorageError::InvalidPath { path } => {
                ApiError::invalid_input(format!("Invalid upload path '{}'", path))
            }
            ObjectStorageError::UploadFailed { path, .. } => {
                ApiError::upload_failed(format!("Upload of '{}' failed", path))
            }
            ObjectStorageError::Unavailable { .. } => {
                ApiError::service_unavailable("Image storage is unavailable")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::InvalidValue { field, reason } => {
                ApiError::validation_failed(format!("Invalid value for '{}': {}", field, reason))
                    .with_details(serde_json::json!({ "field": field }))
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        ApiError::internal_error(format!("Configuration error: {}", err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::invalid_credentials(),
            AuthError::HashingFailed { reason } => {
                tracing::error!("Password hashing failed: {}", reason);
                ApiError::internal_error("Authentication failed")
            }
        }
    }
}

// ============================================================================
// CONVERSIONS FROM STANDARD ERRORS
// ============================================================================

impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        ApiError::database_error("Database operation failed")
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("Connection pool error: {:?}", err);

        match err {
            deadpool_postgres::PoolError::Timeout(_) => ApiError::connection_pool_exhausted(),
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Database connection pool is closed")
            }
            _ => ApiError::database_error("Failed to acquire database connection"),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

impl From<uuid::Error> for ApiError {
    fn from(err: uuid::Error) -> Self {
        ApiError::invalid_format("id", &format!("valid UUID: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::PaintingNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::SlugAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::NotPurchasable.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::UploadFailed.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::DatabaseError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_field_names_field() {
        let err = ApiError::missing_field("title");
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("title"));
        assert_eq!(err.details, Some(serde_json::json!({ "field": "title" })));
    }

    #[test]
    fn test_gallery_error_mapping() {
        let not_found: ApiError = GalleryError::from(StorageError::NotFound { id: Uuid::nil() }).into();
        assert_eq!(not_found.code, ErrorCode::PaintingNotFound);

        let dup: ApiError = GalleryError::from(StorageError::DuplicateSlug {
            slug: "dawn".to_string(),
        })
        .into();
        assert_eq!(dup.code, ErrorCode::SlugAlreadyExists);

        let creds: ApiError = GalleryError::from(AuthError::InvalidCredentials).into();
        assert_eq!(creds.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(creds.message, "Invalid email or password");

        let upload: ApiError = GalleryError::from(ObjectStorageError::UploadFailed {
            path: "p".to_string(),
            reason: "boom".to_string(),
        })
        .into();
        assert_eq!(upload.code, ErrorCode::UploadFailed);
        assert!(!upload.message.contains("boom"));
    }

    #[test]
    fn test_storage_failures_are_generic() {
        let err: ApiError = StorageError::QueryFailed {
            reason: "relation \"paintings\" does not exist".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("relation"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::invalid_credentials();
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("INVALID_CREDENTIALS"));
        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
