//! Purchase inquiry redirect.
//!
//! `GET /inquire/{slug}` resolves the painting through the catalog cache and
//! redirects to the messaging deep link when the painting still accepts
//! inquiries.

use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::get,
    Router,
};
use gallery_core::{find_by_slug, PurchaseControl};
use gallery_storage::CatalogCache;
use std::sync::Arc;

use crate::config::GalleryConfig;
use crate::error::{ApiError, ApiResult};
use crate::routes::catalog::read_catalog;
use crate::state::AppState;
use crate::telemetry::{metrics, InquiryResult};

fn record(result: InquiryResult) {
    if let Some(metrics) = metrics() {
        metrics.record_inquiry(result);
    }
}

/// GET /inquire/{slug} - Redirect to the messaging app
#[utoipa::path(
    get,
    path = "/inquire/{slug}",
    tag = "Inquiry",
    params(
        ("slug" = String, Path, description = "Painting slug"),
    ),
    responses(
        (status = 303, description = "Redirect to the prefilled inquiry message"),
        (status = 404, description = "No painting with this slug", body = ApiError),
        (status = 409, description = "Painting is sold or not for sale", body = ApiError),
    ),
)]
pub async fn inquire(
    State(cache): State<Arc<CatalogCache>>,
    State(config): State<Arc<GalleryConfig>>,
    Path(slug): Path<String>,
) -> ApiResult<Redirect> {
    let read = read_catalog(&cache).await;
    let paintings = read.paintings();

    let Some(painting) = find_by_slug(&paintings, &slug) else {
        record(InquiryResult::NotFound);
        return Err(ApiError::painting_not_found(&slug));
    };

    let control = PurchaseControl::for_painting(painting, &config.whatsapp_number);
    match control.inquiry_url {
        Some(url) if control.enabled => {
            record(InquiryResult::Redirected);
            tracing::info!(slug = %painting.slug, "Purchase inquiry redirected");
            Ok(Redirect::to(&url))
        }
        _ => {
            record(InquiryResult::Rejected);
            Err(ApiError::not_purchasable(&painting.title, &control.label))
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/inquire/:slug", get(inquire))
}
