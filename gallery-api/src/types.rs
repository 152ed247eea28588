//! Request and response types for the gallery API.

use chrono::{DateTime, Utc};
use gallery_core::{
    GalleryState, Painting, PaintingId, PaintingStatus, PurchaseControl,
};
use gallery_storage::CatalogRead;
use serde::{Deserialize, Serialize};

// ============================================================================
// CATALOG STATUS
// ============================================================================

/// How the catalog behind a public response was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogStatus {
    /// `fresh`, `stale` or `unavailable`.
    pub outcome: String,
    /// Whether the snapshot was served without a store query.
    pub cache_hit: bool,
    /// Whether this response waited on the first catalog fetch.
    pub loading: bool,
    /// When the underlying snapshot was fetched, if one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CatalogStatus {
    pub fn from_read(read: &CatalogRead) -> Self {
        Self {
            outcome: read.outcome().as_str().to_string(),
            cache_hit: read.was_cache_hit(),
            loading: read.loading(),
            fetched_at: read.fetched_at(),
        }
    }
}

// ============================================================================
// PUBLIC CATALOG
// ============================================================================

/// One tile in the originals listing or the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PaintingSummary {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: PaintingId,
    pub slug: String,
    pub title: String,
    pub medium: String,
    pub dimensions: String,
    pub year: Option<i32>,
    pub status: PaintingStatus,
    /// `None` for available paintings, otherwise e.g. `"SOLD"`.
    pub badge: Option<String>,
    pub image_url: String,
    pub price_display: Option<String>,
    pub purchase: PurchaseControl,
}

impl PaintingSummary {
    pub fn new(painting: &Painting, whatsapp_number: &str) -> Self {
        Self {
            id: painting.id,
            slug: painting.slug.clone(),
            title: painting.title.clone(),
            medium: painting.medium.clone(),
            dimensions: painting.dimensions.clone(),
            year: painting.year,
            status: painting.status,
            badge: painting.status.badge(),
            image_url: painting.display_image().to_string(),
            price_display: painting.display_price(),
            purchase: PurchaseControl::for_painting(painting, whatsapp_number),
        }
    }
}

/// GET /api/paintings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogResponse {
    pub paintings: Vec<PaintingSummary>,
    pub catalog_status: CatalogStatus,
}

/// GET /api/home
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HomeResponse {
    pub featured: Vec<PaintingSummary>,
    pub catalog_status: CatalogStatus,
}

/// Query string for the detail view.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct DetailQuery {
    /// Index into the image set to show as the selected image.
    pub image: Option<usize>,
}

/// GET /api/paintings/{slug}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PaintingDetailResponse {
    pub painting: Painting,
    /// Main image followed by the additional images, in display order.
    pub images: Vec<String>,
    pub selected_image: usize,
    pub selected_image_url: String,
    pub status_label: String,
    pub badge: Option<String>,
    pub price_display: Option<String>,
    pub purchase: PurchaseControl,
    pub catalog_status: CatalogStatus,
}

impl PaintingDetailResponse {
    pub fn new(
        painting: &Painting,
        gallery: &GalleryState,
        whatsapp_number: &str,
        catalog_status: CatalogStatus,
    ) -> Self {
        Self {
            painting: painting.clone(),
            images: gallery.images().urls().to_vec(),
            selected_image: gallery.selected(),
            selected_image_url: gallery.selected_url().to_string(),
            status_label: painting.status.label().to_string(),
            badge: painting.status.badge(),
            price_display: painting.display_price(),
            purchase: PurchaseControl::for_painting(painting, whatsapp_number),
            catalog_status,
        }
    }
}

// ============================================================================
// ADMIN
// ============================================================================

/// POST /api/admin/login
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub email: String,
}

/// GET /api/admin/stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminStatsResponse {
    pub total: u64,
    pub available: u64,
    pub featured: u64,
}

/// GET /api/admin/paintings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminPaintingListResponse {
    pub paintings: Vec<Painting>,
    pub total: usize,
}

/// POST /api/admin/cache/invalidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CacheInvalidatedResponse {
    pub invalidated: bool,
    pub hits: u64,
    pub misses: u64,
    pub refresh_failures: u64,
}
