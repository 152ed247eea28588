//! Catalog cache with explicit read outcomes.
//!
//! Public catalog reads go through [`CatalogCache`], which keeps one snapshot
//! of the painting list for a bounded staleness window. Every read reports
//! how it was satisfied via [`ReadOutcome`], so callers can tell fresh data
//! from a fallback after a failed refresh.
//!
//! # Example
//!
//! ```ignore
//! let cache = CatalogCache::new(store, CacheConfig::default());
//!
//! let read = cache.get().await;
//! if !read.is_fresh() {
//!     tracing::warn!(outcome = read.outcome().as_str(), "serving degraded catalog");
//! }
//! let paintings = read.paintings();
//! ```

pub mod catalog;
pub mod clock;
pub mod freshness;

pub use catalog::{CacheConfig, CacheStats, CatalogCache, DEFAULT_STALENESS_WINDOW};
pub use clock::{CacheClock, ManualClock, SystemClock};
pub use freshness::{CatalogRead, ReadOutcome};
