//! Process-wide catalog cache.
//!
//! Holds at most one snapshot of the full painting list. A read inside the
//! staleness window is served from the snapshot without touching the store;
//! anything else triggers a single refresh that every concurrent reader
//! shares. A failed refresh never replaces or clears the snapshot.

use chrono::{DateTime, Utc};
use gallery_core::{sort_newest_first, GalleryError, Painting};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::clock::{CacheClock, SystemClock};
use super::freshness::CatalogRead;
use crate::traits::CatalogStore;

/// Default staleness window: five minutes.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(300);

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Snapshots younger than this are served without a store query.
    pub staleness_window: Duration,
    /// Serve the last good snapshot when a refresh fails.
    pub serve_stale_on_error: bool,
    /// Drop the snapshot after admin create/edit/delete.
    pub invalidate_on_admin_write: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            staleness_window: DEFAULT_STALENESS_WINDOW,
            serve_stale_on_error: false,
            invalidate_on_admin_write: false,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_staleness_window(mut self, window: Duration) -> Self {
        self.staleness_window = window;
        self
    }

    pub fn with_serve_stale_on_error(mut self, enabled: bool) -> Self {
        self.serve_stale_on_error = enabled;
        self
    }

    pub fn with_invalidate_on_admin_write(mut self, enabled: bool) -> Self {
        self.invalidate_on_admin_write = enabled;
        self
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub refresh_failures: u64,
    /// Paintings in the current snapshot.
    pub entry_count: u64,
}

impl CacheStats {
    /// Hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ============================================================================
// CACHE
// ============================================================================

#[derive(Debug, Clone)]
struct Slot {
    data: Arc<Vec<Painting>>,
    fetched_at: DateTime<Utc>,
}

pub struct CatalogCache {
    store: Arc<dyn CatalogStore>,
    config: CacheConfig,
    clock: Arc<dyn CacheClock>,
    /// Never held across an await.
    slot: RwLock<Option<Slot>>,
    /// Serialises refreshes.
    refresh_lock: Mutex<()>,
    refreshing: AtomicBool,
    /// Set once the first refresh attempt finishes, successful or not.
    first_fetch_done: AtomicBool,
    /// Completed refresh attempts, successful or not.
    attempts: AtomicU64,
    last_error: RwLock<Option<GalleryError>>,
    hits: AtomicU64,
    misses: AtomicU64,
    refresh_failures: AtomicU64,
}

impl CatalogCache {
    pub fn new(store: Arc<dyn CatalogStore>, config: CacheConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn CatalogStore>,
        config: CacheConfig,
        clock: Arc<dyn CacheClock>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refreshing: AtomicBool::new(false),
            first_fetch_done: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
            last_error: RwLock::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            refresh_failures: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Read the catalog, refreshing it if the snapshot is missing or stale.
    pub async fn get(&self) -> CatalogRead {
        if let Some(read) = self.read_if_fresh() {
            return read;
        }
        let loading = !self.first_fetch_done.load(Ordering::SeqCst);
        self.get_slow().await.with_loading(loading)
    }

    async fn get_slow(&self) -> CatalogRead {
        let attempts_before = self.attempts.load(Ordering::SeqCst);
        let _guard = self.refresh_lock.lock().await;

        // Another caller refreshed while we waited.
        if let Some(read) = self.read_if_fresh() {
            return read;
        }
        if self.attempts.load(Ordering::SeqCst) != attempts_before {
            if let Some(error) = self.last_error() {
                return CatalogRead::failed(
                    self.current_slot().map(|s| (s.data, s.fetched_at)),
                    error,
                    self.config.serve_stale_on_error,
                );
            }
        }

        self.refresh_locked().await
    }

    /// Refresh from the store regardless of snapshot age.
    pub async fn force_refresh(&self) -> CatalogRead {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Drop the snapshot so the next read goes to the store.
    pub fn invalidate(&self) {
        match self.slot.write() {
            Ok(mut slot) => {
                if slot.take().is_some() {
                    info!("Catalog cache invalidated");
                }
            }
            Err(_) => warn!("Catalog cache slot lock poisoned during invalidate"),
        }
    }

    /// Invalidate if configured to follow admin writes.
    pub fn on_admin_write(&self) {
        if self.config.invalidate_on_admin_write {
            self.invalidate();
        }
    }

    /// True only while the first fetch for the process is in flight and
    /// nothing is cached. Refetches after invalidation do not count.
    pub fn is_loading(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
            && !self.first_fetch_done.load(Ordering::SeqCst)
            && self.current_slot().is_none()
    }

    /// Age of the stored snapshot, measured on the cache's clock.
    pub fn snapshot_age(&self) -> Option<chrono::Duration> {
        self.current_slot()
            .map(|slot| self.clock.now().signed_duration_since(slot.fetched_at))
    }

    /// The stored snapshot and when it was fetched.
    pub fn snapshot(&self) -> Option<(Arc<Vec<Painting>>, DateTime<Utc>)> {
        self.current_slot().map(|s| (s.data, s.fetched_at))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            entry_count: self
                .current_slot()
                .map(|s| s.data.len() as u64)
                .unwrap_or(0),
        }
    }

    fn current_slot(&self) -> Option<Slot> {
        self.slot.read().ok().and_then(|slot| slot.clone())
    }

    fn last_error(&self) -> Option<GalleryError> {
        self.last_error.read().ok().and_then(|e| e.clone())
    }

    fn read_if_fresh(&self) -> Option<CatalogRead> {
        let slot = self.current_slot()?;
        let age = self.clock.now().signed_duration_since(slot.fetched_at);
        let fresh = age
            .to_std()
            .map(|age| age < self.config.staleness_window)
            // Negative age means the clock went backwards; treat as fresh.
            .unwrap_or(true);

        if !fresh {
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(CatalogRead::from_cache(
            slot.data,
            slot.fetched_at,
            self.config.serve_stale_on_error,
        ))
    }

    /// Must be called with `refresh_lock` held.
    async fn refresh_locked(&self) -> CatalogRead {
        self.misses.fetch_add(1, Ordering::Relaxed);
        let _refreshing = RefreshingFlag::raise(&self.refreshing);
        debug!("Refreshing catalog cache from store");

        let result = self.store.list_paintings().await;
        let read = match result {
            Ok(mut paintings) => {
                sort_newest_first(&mut paintings);
                let data = Arc::new(paintings);
                let fetched_at = self.clock.now();

                match self.slot.write() {
                    Ok(mut slot) => {
                        *slot = Some(Slot {
                            data: Arc::clone(&data),
                            fetched_at,
                        })
                    }
                    Err(_) => warn!("Catalog cache slot lock poisoned; serving uncached"),
                }
                if let Ok(mut last) = self.last_error.write() {
                    *last = None;
                }

                debug!(count = data.len(), "Catalog cache refreshed");
                CatalogRead::from_store(data, fetched_at, self.config.serve_stale_on_error)
            }
            Err(error) => {
                self.refresh_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %error, "Catalog refresh failed; keeping previous snapshot");
                if let Ok(mut last) = self.last_error.write() {
                    *last = Some(error.clone());
                }
                CatalogRead::failed(
                    self.snapshot(),
                    error,
                    self.config.serve_stale_on_error,
                )
            }
        };

        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.first_fetch_done.store(true, Ordering::SeqCst);
        read
    }
}

/// Holds `refreshing` high until dropped, so a cancelled refresh clears it.
struct RefreshingFlag<'a>(&'a AtomicBool);

impl<'a> RefreshingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RefreshingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::freshness::ReadOutcome;
    use crate::memory::InMemoryStore;
    use gallery_core::featured_for_home;
    use gallery_test_utils::assertions::assert_newest_first;
    use gallery_test_utils::generators::arb_catalog;
    use gallery_test_utils::painting_created_at;
    use proptest::prelude::*;

    fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.seed(painting_created_at("old", 0)).unwrap();
        store.seed(painting_created_at("new", 20)).unwrap();
        store.seed(painting_created_at("mid", 10)).unwrap();
        store
    }

    fn cache_with_clock(store: Arc<InMemoryStore>, config: CacheConfig) -> (CatalogCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = CatalogCache::with_clock(store, config, clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_first_read_queries_store_once() {
        let store = seeded_store();
        let (cache, _clock) = cache_with_clock(store.clone(), CacheConfig::default());

        assert!(cache.snapshot().is_none());
        let read = cache.get().await;
        assert!(read.is_fresh());
        assert!(!read.was_cache_hit());
        assert_eq!(read.paintings().len(), 3);
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_staleness_window_boundary() {
        let store = seeded_store();
        let (cache, clock) = cache_with_clock(store.clone(), CacheConfig::default());

        let first = cache.get().await.paintings();

        clock.advance(chrono::Duration::seconds(299));
        let hit = cache.get().await;
        assert!(hit.was_cache_hit());
        assert!(Arc::ptr_eq(&hit.paintings(), &first));
        assert_eq!(store.list_calls(), 1);

        clock.advance(chrono::Duration::seconds(2));
        let miss = cache.get().await;
        assert!(!miss.was_cache_hit());
        assert_eq!(store.list_calls(), 2);
        assert!(!Arc::ptr_eq(&miss.paintings(), &first));
    }

    #[tokio::test]
    async fn test_failed_refresh_does_not_poison_snapshot() {
        let store = seeded_store();
        let (cache, clock) = cache_with_clock(store.clone(), CacheConfig::default());

        let good = cache.get().await.paintings();
        clock.advance(chrono::Duration::seconds(301));
        store.set_failing(true);

        let read = cache.get().await;
        assert!(matches!(read.outcome(), ReadOutcome::Stale { .. }));
        assert!(read.paintings().is_empty());

        let (kept, _) = cache.snapshot().unwrap();
        assert!(Arc::ptr_eq(&kept, &good));
        assert_eq!(cache.stats().refresh_failures, 1);

        store.set_failing(false);
        assert!(cache.get().await.is_fresh());
    }

    #[tokio::test]
    async fn test_serve_stale_policy_returns_last_snapshot() {
        let store = seeded_store();
        let config = CacheConfig::new().with_serve_stale_on_error(true);
        let (cache, clock) = cache_with_clock(store.clone(), config);

        let good = cache.get().await.paintings();
        clock.advance(chrono::Duration::minutes(10));
        store.set_failing(true);

        let read = cache.get().await;
        assert!(matches!(read.outcome(), ReadOutcome::Stale { .. }));
        assert!(Arc::ptr_eq(&read.paintings(), &good));
    }

    #[tokio::test]
    async fn test_failure_with_empty_cache_is_unavailable() {
        let store = seeded_store();
        store.set_failing(true);
        let (cache, _clock) = cache_with_clock(store, CacheConfig::default());

        let read = cache.get().await;
        assert!(matches!(read.outcome(), ReadOutcome::Unavailable { .. }));
        assert!(read.paintings().is_empty());
        assert!(cache.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_paintings_sorted_newest_first() {
        let store = seeded_store();
        let (cache, _clock) = cache_with_clock(store, CacheConfig::default());

        let paintings = cache.get().await.paintings();
        assert_newest_first(&paintings);
        let slugs: Vec<_> = paintings.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_invalidate_forces_next_read_to_store() {
        let store = seeded_store();
        let (cache, _clock) = cache_with_clock(store.clone(), CacheConfig::default());

        cache.get().await;
        cache.invalidate();
        assert!(cache.snapshot().is_none());
        cache.get().await;
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_admin_write_hook_respects_config() {
        let store = seeded_store();
        let (passive, _c1) = cache_with_clock(store.clone(), CacheConfig::default());
        passive.get().await;
        passive.on_admin_write();
        assert!(passive.snapshot().is_some());

        let config = CacheConfig::new().with_invalidate_on_admin_write(true);
        let (active, _c2) = cache_with_clock(store, config);
        active.get().await;
        active.on_admin_write();
        assert!(active.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_window() {
        let store = seeded_store();
        let (cache, _clock) = cache_with_clock(store.clone(), CacheConfig::default());

        cache.get().await;
        let read = cache.force_refresh().await;
        assert!(!read.was_cache_hit());
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_share_one_refresh() {
        let store = seeded_store();
        store.set_list_delay(Duration::from_millis(100));
        let cache = Arc::new(CatalogCache::new(store.clone(), CacheConfig::default()));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move { cache.get().await.paintings().len() });
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.is_loading());

        while let Some(len) = tasks.join_next().await {
            assert_eq!(len.unwrap(), 3);
        }
        assert_eq!(store.list_calls(), 1);
        assert!(!cache.is_loading());
    }

    #[tokio::test]
    async fn test_first_read_reports_loading() {
        let store = seeded_store();
        let (cache, _clock) = cache_with_clock(store, CacheConfig::default());

        assert!(cache.get().await.loading());
        assert!(!cache.get().await.loading());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_refetch_after_invalidate_is_not_loading() {
        let store = seeded_store();
        let cache = Arc::new(CatalogCache::new(store.clone(), CacheConfig::default()));
        cache.get().await;
        cache.invalidate();

        store.set_list_delay(Duration::from_millis(100));
        let reader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.snapshot().is_none());
        assert!(!cache.is_loading());

        let read = reader.await.unwrap();
        assert!(read.is_fresh());
        assert!(!read.loading());
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_ends_loading() {
        let store = seeded_store();
        store.set_failing(true);
        let (cache, _clock) = cache_with_clock(store.clone(), CacheConfig::default());

        let read = cache.get().await;
        assert!(read.loading());
        assert!(!cache.is_loading());

        store.set_failing(false);
        assert!(!cache.get().await.loading());
    }

    #[tokio::test]
    async fn test_cancelled_refresh_clears_loading() {
        let store = seeded_store();
        store.set_list_delay(Duration::from_millis(200));
        let cache = CatalogCache::new(store.clone(), CacheConfig::default());

        let timed_out = tokio::time::timeout(Duration::from_millis(20), cache.get()).await;
        assert!(timed_out.is_err());
        assert!(!cache.is_loading());

        store.set_list_delay(Duration::ZERO);
        let read = cache.get().await;
        assert!(read.is_fresh());
        assert!(read.loading());
    }

    #[tokio::test]
    async fn test_snapshot_age_follows_cache_clock() {
        let store = seeded_store();
        let (cache, clock) = cache_with_clock(store, CacheConfig::default());

        assert!(cache.snapshot_age().is_none());
        cache.get().await;
        assert_eq!(cache.snapshot_age(), Some(chrono::Duration::zero()));

        clock.advance(chrono::Duration::seconds(42));
        assert_eq!(cache.snapshot_age(), Some(chrono::Duration::seconds(42)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_share_one_failure() {
        let store = seeded_store();
        store.set_failing(true);
        store.set_list_delay(Duration::from_millis(100));
        let cache = Arc::new(CatalogCache::new(store.clone(), CacheConfig::default()));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move { cache.get().await.outcome().as_str() });
        }
        while let Some(outcome) = tasks.join_next().await {
            assert_eq!(outcome.unwrap(), "unavailable");
        }
        assert_eq!(store.list_calls(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_cached_catalog_is_complete_and_newest_first(catalog in arb_catalog(12)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let store = Arc::new(InMemoryStore::new());
            for painting in &catalog {
                store.seed(painting.clone()).unwrap();
            }
            let cache = CatalogCache::new(store, CacheConfig::default());

            let paintings = runtime.block_on(cache.get()).paintings();
            prop_assert_eq!(paintings.len(), catalog.len());
            assert_newest_first(&paintings);

            let mut flagged: Vec<_> = catalog
                .iter()
                .filter(|p| p.is_featured_home)
                .map(|p| p.created_at)
                .collect();
            flagged.sort_by(|a, b| b.cmp(a));
            flagged.truncate(2);

            let featured = featured_for_home(&paintings);
            prop_assert!(featured.iter().all(|p| p.is_featured_home));
            let featured_at: Vec<_> = featured.iter().map(|p| p.created_at).collect();
            prop_assert_eq!(featured_at, flagged);
        }
    }

    #[test]
    fn test_cache_config_builder() {
        let config = CacheConfig::new()
            .with_staleness_window(Duration::from_secs(60))
            .with_serve_stale_on_error(true)
            .with_invalidate_on_admin_write(true);

        assert_eq!(config.staleness_window, Duration::from_secs(60));
        assert!(config.serve_stale_on_error);
        assert!(config.invalidate_on_admin_write);
        assert_eq!(CacheConfig::default().staleness_window, DEFAULT_STALENESS_WINDOW);
    }

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);
        assert!((CacheStats::default().hit_rate() - 0.0).abs() < 0.001);
    }
}
