//! Local filesystem object store.

use async_trait::async_trait;
use bytes::Bytes;
use gallery_core::{GalleryResult, ObjectStorageError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use super::validate_object_path;
use crate::traits::ObjectStore;

/// Writes objects under a root directory. The API serves that directory at
/// the configured public base URL.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemObjectStore {
    pub async fn new(
        root: impl AsRef<Path>,
        public_base_url: impl Into<String>,
    ) -> GalleryResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| ObjectStorageError::Unavailable {
                reason: format!("cannot create storage root {}: {}", root.display(), e),
            })?;

        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn upload_error(path: &str, err: std::io::Error) -> ObjectStorageError {
        ObjectStorageError::UploadFailed {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> GalleryResult<String> {
        validate_object_path(path)?;
        let target = self.root.join(path);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::upload_error(path, e))?;
        }

        // Write to a unique temp file, then rename into place.
        let temp = target.with_file_name(format!(
            "{}.tmp.{}",
            target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Uuid::now_v7()
        ));
        {
            let mut file = fs::File::create(&temp)
                .await
                .map_err(|e| Self::upload_error(path, e))?;
            file.write_all(&data)
                .await
                .map_err(|e| Self::upload_error(path, e))?;
            file.sync_all()
                .await
                .map_err(|e| Self::upload_error(path, e))?;
        }
        fs::rename(&temp, &target)
            .await
            .map_err(|e| Self::upload_error(path, e))?;

        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::GalleryError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemObjectStore::new(dir.path(), "http://localhost:3000/media/")
            .await
            .unwrap();

        let url = store
            .upload(
                "paintings/1-main-a.jpg",
                Bytes::from_static(b"jpeg bytes"),
                "image/jpeg",
            )
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/media/paintings/1-main-a.jpg");
        let written = std::fs::read(dir.path().join("paintings/1-main-a.jpg")).unwrap();
        assert_eq!(written, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_upload_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemObjectStore::new(dir.path(), "/media").await.unwrap();
        store
            .upload("paintings/x.png", Bytes::from_static(b"1"), "image/png")
            .await
            .unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path().join("paintings"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["x.png"]);
    }

    #[tokio::test]
    async fn test_upload_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemObjectStore::new(dir.path(), "/media").await.unwrap();

        let err = store
            .upload("../outside.jpg", Bytes::from_static(b"x"), "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GalleryError::ObjectStorage(ObjectStorageError::InvalidPath { .. })
        ));
    }
}
