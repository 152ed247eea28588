//! In-memory stores for tests and local runs.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use gallery_core::{
    sort_newest_first, AdminAccount, GalleryResult, ObjectStorageError, Painting, PaintingDraft,
    PaintingFilter, PaintingId, StorageError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

use crate::object::validate_object_path;
use crate::traits::{AdminStore, CatalogStore, ObjectStore};

// ============================================================================
// CATALOG + ADMIN STORE
// ============================================================================

/// In-memory catalog and admin store.
///
/// Counts `list_paintings` calls and can be told to fail or slow them down,
/// which is what the catalog cache tests need.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    paintings: Arc<RwLock<HashMap<Uuid, Painting>>>,
    admins: Arc<RwLock<HashMap<String, AdminAccount>>>,
    list_calls: AtomicUsize,
    fail_lists: AtomicBool,
    list_delay_ms: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed painting, keeping its id and timestamps.
    pub fn seed(&self, painting: Painting) -> GalleryResult<()> {
        let mut paintings = self.paintings.write().map_err(|_| StorageError::LockPoisoned)?;
        paintings.insert(painting.id, painting);
        Ok(())
    }

    /// Number of `list_paintings` calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent `list_paintings` call fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.fail_lists.store(failing, Ordering::SeqCst);
    }

    /// Delay each `list_paintings` call.
    pub fn set_list_delay(&self, delay: Duration) {
        self.list_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn painting_count(&self) -> usize {
        self.paintings.read().map(|p| p.len()).unwrap_or(0)
    }

    fn slug_taken(
        paintings: &HashMap<Uuid, Painting>,
        slug: &str,
        except: Option<PaintingId>,
    ) -> bool {
        paintings
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except)
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_paintings(&self) -> GalleryResult<Vec<Painting>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.list_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StorageError::QueryFailed {
                reason: "injected failure".to_string(),
            }
            .into());
        }

        let paintings = self.paintings.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut all: Vec<Painting> = paintings.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn count_paintings(&self, filter: PaintingFilter) -> GalleryResult<u64> {
        let paintings = self.paintings.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(paintings.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn get_painting(&self, id: PaintingId) -> GalleryResult<Option<Painting>> {
        let paintings = self.paintings.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(paintings.get(&id).cloned())
    }

    async fn insert_painting(&self, draft: &PaintingDraft) -> GalleryResult<Painting> {
        let mut paintings = self.paintings.write().map_err(|_| StorageError::LockPoisoned)?;
        if Self::slug_taken(&paintings, &draft.slug, None) {
            return Err(StorageError::DuplicateSlug {
                slug: draft.slug.clone(),
            }
            .into());
        }

        let now = Utc::now();
        let painting = Painting {
            id: Uuid::now_v7(),
            slug: draft.slug.clone(),
            title: draft.title.clone(),
            medium: draft.medium.clone(),
            dimensions: draft.dimensions.clone(),
            year: draft.year,
            description: draft.description.clone(),
            status: draft.status,
            price: draft.price,
            main_image_url: draft.main_image_url.clone(),
            additional_image_urls: draft.additional_image_urls.clone(),
            is_featured_home: draft.is_featured_home,
            created_at: now,
            updated_at: now,
        };
        paintings.insert(painting.id, painting.clone());
        Ok(painting)
    }

    async fn update_painting(
        &self,
        id: PaintingId,
        draft: &PaintingDraft,
    ) -> GalleryResult<Painting> {
        let mut paintings = self.paintings.write().map_err(|_| StorageError::LockPoisoned)?;
        if Self::slug_taken(&paintings, &draft.slug, Some(id)) {
            return Err(StorageError::DuplicateSlug {
                slug: draft.slug.clone(),
            }
            .into());
        }

        let painting = paintings
            .get_mut(&id)
            .ok_or(StorageError::NotFound { id })?;

        painting.slug = draft.slug.clone();
        painting.title = draft.title.clone();
        painting.medium = draft.medium.clone();
        painting.dimensions = draft.dimensions.clone();
        painting.year = draft.year;
        painting.description = draft.description.clone();
        painting.status = draft.status;
        painting.price = draft.price;
        painting.main_image_url = draft.main_image_url.clone();
        painting.additional_image_urls = draft.additional_image_urls.clone();
        painting.is_featured_home = draft.is_featured_home;
        painting.updated_at = Utc::now();

        Ok(painting.clone())
    }

    async fn delete_painting(&self, id: PaintingId) -> GalleryResult<()> {
        let mut paintings = self.paintings.write().map_err(|_| StorageError::LockPoisoned)?;
        paintings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound { id }.into())
    }
}

#[async_trait]
impl AdminStore for InMemoryStore {
    async fn find_admin_by_email(&self, email: &str) -> GalleryResult<Option<AdminAccount>> {
        let admins = self.admins.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(admins.get(email).cloned())
    }

    async fn insert_admin(&self, account: &AdminAccount) -> GalleryResult<()> {
        let mut admins = self.admins.write().map_err(|_| StorageError::LockPoisoned)?;
        admins.insert(account.email.clone(), account.clone());
        Ok(())
    }
}

// ============================================================================
// OBJECT STORE
// ============================================================================

/// Object store that keeps uploads in memory, in upload order.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    base_url: String,
    uploads: RwLock<Vec<(String, Bytes, String)>>,
    fail_uploads: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            uploads: RwLock::new(Vec::new()),
            fail_uploads: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_uploads.store(failing, Ordering::SeqCst);
    }

    /// Uploaded paths in the order they were written.
    pub fn uploaded_paths(&self) -> Vec<String> {
        self.uploads
            .read()
            .map(|u| u.iter().map(|(path, _, _)| path.clone()).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.uploads.read().ok().and_then(|u| {
            u.iter()
                .find(|(p, _, _)| p == path)
                .map(|(_, data, _)| data.clone())
        })
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new("http://objects.local")
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> GalleryResult<String> {
        validate_object_path(path)?;
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ObjectStorageError::UploadFailed {
                path: path.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }

        let mut uploads = self.uploads.write().map_err(|_| ObjectStorageError::Unavailable {
            reason: "upload log lock poisoned".to_string(),
        })?;
        uploads.push((path.to_string(), data, content_type.to_string()));
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
