//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use gallery_storage::{AdminStore, CatalogCache, CatalogStore, ObjectStore};

use crate::auth::AuthConfig;
use crate::config::GalleryConfig;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Direct store access. Only admin routes use it; public reads go
    /// through `cache`.
    pub catalog: Arc<dyn CatalogStore>,
    pub admins: Arc<dyn AdminStore>,
    pub objects: Arc<dyn ObjectStore>,
    /// Process-wide catalog snapshot for public pages.
    pub cache: Arc<CatalogCache>,
    pub auth: Arc<AuthConfig>,
    pub config: Arc<GalleryConfig>,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the stores together. The cache reads from `catalog` with the
    /// settings in `config`.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        admins: Arc<dyn AdminStore>,
        objects: Arc<dyn ObjectStore>,
        auth: AuthConfig,
        config: GalleryConfig,
    ) -> Self {
        let cache = Arc::new(CatalogCache::new(catalog.clone(), config.cache_config()));
        Self {
            catalog,
            admins,
            objects,
            cache,
            auth: Arc::new(auth),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Replace the cache, e.g. with one driven by a manual clock.
    pub fn with_cache(mut self, cache: Arc<CatalogCache>) -> Self {
        self.cache = cache;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("objects", &self.objects.backend_name())
            .field("auth", &self.auth)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

crate::impl_from_ref!(Arc<dyn CatalogStore>, catalog);
crate::impl_from_ref!(Arc<dyn AdminStore>, admins);
crate::impl_from_ref!(Arc<dyn ObjectStore>, objects);
crate::impl_from_ref!(Arc<CatalogCache>, cache);
crate::impl_from_ref!(Arc<AuthConfig>, auth);
crate::impl_from_ref!(Arc<GalleryConfig>, config);
crate::impl_from_ref!(Instant, start_time);
