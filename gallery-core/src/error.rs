//! Error types for gallery operations

use thiserror::Error;
use uuid::Uuid;

/// Catalog store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Painting not found: {id}")]
    NotFound { id: Uuid },

    #[error("A painting with slug '{slug}' already exists")]
    DuplicateSlug { slug: String },

    #[error("Insert failed: {reason}")]
    InsertFailed { reason: String },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Malformed row in column {column}: {reason}")]
    MalformedRow { column: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Object storage (image upload) errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ObjectStorageError {
    #[error("Invalid object path: {path}")]
    InvalidPath { path: String },

    #[error("Upload of {path} failed: {reason}")]
    UploadFailed { path: String, reason: String },

    #[error("Object storage backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Admin authentication errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },
}

/// Gallery navigation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Image index {index} out of range for a set of {len} images")]
    OutOfRange { index: usize, len: usize },
}

/// Master error type for all gallery errors.
#[derive(Debug, Clone, Error)]
pub enum GalleryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Object storage error: {0}")]
    ObjectStorage(#[from] ObjectStorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),
}

/// Result type alias for gallery operations.
pub type GalleryResult<T> = Result<T, GalleryError>;
