//! Hosted object storage over its REST API.
//!
//! Uploads go to `POST {base}/storage/v1/object/{bucket}/{path}` and objects
//! are read back from `{base}/storage/v1/object/public/{bucket}/{path}`.

use async_trait::async_trait;
use bytes::Bytes;
use gallery_core::{GalleryResult, ObjectStorageError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::instrument;

use super::validate_object_path;
use crate::traits::ObjectStore;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    #[serde(default, alias = "error")]
    message: Option<String>,
}

#[derive(Clone)]
pub struct HttpObjectStore {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl HttpObjectStore {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        service_key: impl Into<String>,
    ) -> GalleryResult<Self> {
        let client = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|e| ObjectStorageError::Unavailable {
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            service_key: service_key.into(),
        })
    }

    fn upload_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }
}

impl fmt::Debug for HttpObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpObjectStore")
            .field("base_url", &self.base_url)
            .field("bucket", &self.bucket)
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    #[instrument(skip(self, data), fields(backend = "http", bucket = %self.bucket, size = data.len()))]
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> GalleryResult<String> {
        validate_object_path(path)?;

        let response = self
            .client
            .post(self.upload_url(path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| ObjectStorageError::UploadFailed {
                path: path.to_string(),
                reason: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(self.public_url(path));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StorageErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);

        Err(match status {
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ObjectStorageError::Unavailable {
                    reason: format!("{}: {}", status, message),
                }
            }
            _ => ObjectStorageError::UploadFailed {
                path: path.to_string(),
                reason: format!("{}: {}", status, message),
            },
        }
        .into())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::GalleryError;

    #[test]
    fn test_urls() {
        let store = HttpObjectStore::new("https://storage.test/", "paintings", "key").unwrap();
        assert_eq!(
            store.upload_url("paintings/1-main-a.jpg"),
            "https://storage.test/storage/v1/object/paintings/paintings/1-main-a.jpg"
        );
        assert_eq!(
            store.public_url("paintings/1-main-a.jpg"),
            "https://storage.test/storage/v1/object/public/paintings/paintings/1-main-a.jpg"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let store = HttpObjectStore::new("https://storage.test", "b", "super-secret").unwrap();
        let debug = format!("{:?}", store);
        assert!(!debug.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_upload() {
        let store = HttpObjectStore::new("http://127.0.0.1:9", "b", "k").unwrap();
        let err = store
            .upload("paintings/a.jpg", Bytes::from_static(b"x"), "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GalleryError::ObjectStorage(ObjectStorageError::UploadFailed { .. })
        ));
    }
}
