//! Object storage backends and upload path conventions.
//!
//! Images live under `paintings/`: the main image at
//! `paintings/<millis>-main-<name>` and each additional image at
//! `paintings/<millis>-additional-<i>-<name>`.

mod fs;
mod http;

pub use fs::FilesystemObjectStore;
pub use http::HttpObjectStore;

use gallery_core::ObjectStorageError;
use std::path::{Component, Path};

const IMAGE_PREFIX: &str = "paintings";

pub fn main_image_path(millis: i64, file_name: &str) -> String {
    format!("{}/{}-main-{}", IMAGE_PREFIX, millis, sanitize_file_name(file_name))
}

pub fn additional_image_path(millis: i64, index: usize, file_name: &str) -> String {
    format!(
        "{}/{}-additional-{}-{}",
        IMAGE_PREFIX,
        millis,
        index,
        sanitize_file_name(file_name)
    )
}

/// Reduce an uploaded file name to `[A-Za-z0-9._-]`.
///
/// Directory parts are dropped and other characters become `_`. An empty
/// result becomes `image`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Reject empty, absolute or traversing object paths.
pub fn validate_object_path(path: &str) -> Result<(), ObjectStorageError> {
    let invalid = || ObjectStorageError::InvalidPath {
        path: path.to_string(),
    };

    if path.is_empty() || path.starts_with('/') || path.starts_with('\\') || path.contains("..") {
        return Err(invalid());
    }

    if Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(invalid());
    }

    Ok(())
}
