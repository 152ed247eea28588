//! Gallery Storage - Store Traits, Object Storage and the Catalog Cache
//!
//! Defines the persistence seams for paintings, admin accounts and images,
//! an in-memory implementation of each, and the process-wide catalog cache
//! that public reads go through.

pub mod cache;
pub mod memory;
pub mod object;
pub mod traits;

pub use cache::{
    CacheClock, CacheConfig, CacheStats, CatalogCache, CatalogRead, ManualClock, ReadOutcome,
    SystemClock, DEFAULT_STALENESS_WINDOW,
};
pub use memory::{InMemoryObjectStore, InMemoryStore};
pub use object::{
    additional_image_path, main_image_path, sanitize_file_name, validate_object_path,
    FilesystemObjectStore, HttpObjectStore,
};
pub use traits::{AdminStore, CatalogStore, ObjectStore};
