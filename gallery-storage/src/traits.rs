//! Store traits.
//!
//! The Postgres implementation lives in gallery-api; [`crate::InMemoryStore`]
//! backs tests and local runs.

use async_trait::async_trait;
use bytes::Bytes;
use gallery_core::{
    AdminAccount, GalleryResult, Painting, PaintingDraft, PaintingFilter, PaintingId,
};

/// Persistent catalog of paintings.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All paintings, newest first by `created_at`.
    async fn list_paintings(&self) -> GalleryResult<Vec<Painting>>;

    async fn count_paintings(&self, filter: PaintingFilter) -> GalleryResult<u64>;

    async fn get_painting(&self, id: PaintingId) -> GalleryResult<Option<Painting>>;

    /// Insert a new painting. The store assigns `id`, `created_at` and `updated_at`.
    ///
    /// Fails with `StorageError::DuplicateSlug` if the slug is taken.
    async fn insert_painting(&self, draft: &PaintingDraft) -> GalleryResult<Painting>;

    /// Overwrite the writable fields and bump `updated_at`.
    async fn update_painting(
        &self,
        id: PaintingId,
        draft: &PaintingDraft,
    ) -> GalleryResult<Painting>;

    /// Hard delete. Fails with `StorageError::NotFound` if absent.
    async fn delete_painting(&self, id: PaintingId) -> GalleryResult<()>;
}

/// Admin account lookup.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Look up an account by its lowercased email.
    async fn find_admin_by_email(&self, email: &str) -> GalleryResult<Option<AdminAccount>>;

    async fn insert_admin(&self, account: &AdminAccount) -> GalleryResult<()>;
}

/// Blob storage for painting images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` at `path` and return its public URL.
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> GalleryResult<String>;

    /// Public URL for an object path, whether or not it exists yet.
    fn public_url(&self, path: &str) -> String;

    fn backend_name(&self) -> &'static str;
}
