//! Public Catalog Routes
//!
//! Home page selection, the originals listing and painting detail. Every
//! handler reads through the catalog cache; none of them touches the store
//! directly, and none of them fails when the cache cannot refresh.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use gallery_core::{featured_for_home, find_by_slug, GalleryState};
use gallery_storage::{CatalogCache, CatalogRead};
use std::sync::Arc;

use crate::config::GalleryConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::telemetry::metrics;
use crate::types::{
    CatalogResponse, CatalogStatus, DetailQuery, HomeResponse, PaintingDetailResponse,
    PaintingSummary,
};

/// Read the catalog and record how the read went.
pub(crate) async fn read_catalog(cache: &CatalogCache) -> CatalogRead {
    let read = cache.get().await;

    if let Some(metrics) = metrics() {
        metrics.record_catalog_read(&read);
    }
    if let Some(error) = read.outcome().error() {
        tracing::warn!(
            outcome = read.outcome().as_str(),
            error = %error,
            serving = read.paintings().len(),
            "Serving degraded catalog"
        );
    }

    read
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/home - Featured paintings for the home page
#[utoipa::path(
    get,
    path = "/api/home",
    tag = "Catalog",
    responses(
        (status = 200, description = "At most two featured paintings, newest first", body = HomeResponse),
    ),
)]
pub async fn home(
    State(cache): State<Arc<CatalogCache>>,
    State(config): State<Arc<GalleryConfig>>,
) -> Json<HomeResponse> {
    let read = read_catalog(&cache).await;
    let paintings = read.paintings();

    let featured = featured_for_home(&paintings)
        .into_iter()
        .map(|p| PaintingSummary::new(p, &config.whatsapp_number))
        .collect();

    Json(HomeResponse {
        featured,
        catalog_status: CatalogStatus::from_read(&read),
    })
}

/// GET /api/paintings - Every painting with its badge and purchase control
#[utoipa::path(
    get,
    path = "/api/paintings",
    tag = "Catalog",
    responses(
        (status = 200, description = "All paintings, newest first", body = CatalogResponse),
    ),
)]
pub async fn list_paintings(
    State(cache): State<Arc<CatalogCache>>,
    State(config): State<Arc<GalleryConfig>>,
) -> Json<CatalogResponse> {
    let read = read_catalog(&cache).await;

    let paintings = read
        .paintings()
        .iter()
        .map(|p| PaintingSummary::new(p, &config.whatsapp_number))
        .collect();

    Json(CatalogResponse {
        paintings,
        catalog_status: CatalogStatus::from_read(&read),
    })
}

/// GET /api/paintings/{slug} - Painting detail with its image set
#[utoipa::path(
    get,
    path = "/api/paintings/{slug}",
    tag = "Catalog",
    params(
        ("slug" = String, Path, description = "Painting slug"),
        DetailQuery,
    ),
    responses(
        (status = 200, description = "Painting detail", body = PaintingDetailResponse),
        (status = 400, description = "Image index malformed or out of range", body = ApiError),
        (status = 404, description = "No painting with this slug", body = ApiError),
    ),
)]
pub async fn get_painting(
    State(cache): State<Arc<CatalogCache>>,
    State(config): State<Arc<GalleryConfig>>,
    Path(slug): Path<String>,
    query: Result<Query<DetailQuery>, QueryRejection>,
) -> ApiResult<Json<PaintingDetailResponse>> {
    let Query(query) =
        query.map_err(|_| ApiError::invalid_format("image", "a non-negative integer"))?;
    let read = read_catalog(&cache).await;
    let paintings = read.paintings();

    let painting =
        find_by_slug(&paintings, &slug).ok_or_else(|| ApiError::painting_not_found(&slug))?;

    let mut gallery = GalleryState::for_painting(painting);
    if let Some(index) = query.image {
        gallery.select_thumbnail(index)?;
    }

    Ok(Json(PaintingDetailResponse::new(
        painting,
        &gallery,
        &config.whatsapp_number,
        CatalogStatus::from_read(&read),
    )))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/home", get(home))
        .route("/paintings", get(list_paintings))
        .route("/paintings/:slug", get(get_painting))
}
