//! Gallery Core - Catalog Types and Rules
//!
//! Painting records, status rules, featured selection, purchase inquiry links
//! and the detail-page navigation state. No I/O lives here; every other crate
//! depends on this one.

use chrono::{DateTime, Utc};

pub mod admin;
pub mod catalog;
pub mod error;
pub mod gallery;
pub mod inquiry;
pub mod painting;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

pub use admin::{normalize_email, AdminAccount, DEFAULT_ADMIN_EMAIL};
pub use catalog::{featured_for_home, find_by_slug, sort_newest_first, HOME_FEATURED_LIMIT};
pub use error::{
    AuthError, ConfigError, GalleryError, GalleryResult, NavigationError, ObjectStorageError,
    StorageError, ValidationError,
};
pub use gallery::{CloseReason, GalleryState, ImageSet, Lightbox};
pub use inquiry::{
    inquiry_link, inquiry_message, purchase_label, PurchaseControl, DEFAULT_WHATSAPP_NUMBER,
};
pub use painting::{
    format_inr, Painting, PaintingDraft, PaintingFilter, PaintingId, PaintingStatus,
    PLACEHOLDER_IMAGE,
};
