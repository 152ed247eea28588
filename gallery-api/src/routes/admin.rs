//! Admin REST API Routes
//!
//! Login, dashboard stats and painting create/edit/delete. Everything except
//! login sits behind the session middleware. Writes go straight to the store;
//! the public cache is only touched through `CatalogCache::on_admin_write`.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use chrono::Utc;
use gallery_core::{Painting, PaintingDraft, PaintingFilter, PaintingId, PaintingStatus};
use gallery_storage::{additional_image_path, main_image_path, AdminStore, ObjectStore};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::{authenticate_admin, issue_session_token, AuthConfig};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminExtractor;
use crate::state::AppState;
use crate::telemetry::metrics;
use crate::types::{
    AdminPaintingListResponse, AdminStatsResponse, CacheInvalidatedResponse, LoginRequest,
    LoginResponse,
};

// ============================================================================
// MULTIPART FORM
// ============================================================================

/// Field carrying additional image URLs to keep on edit, in display order.
const EXISTING_ADDITIONAL_FIELD: &str = "existing_additional_image_urls";

#[derive(Debug, Clone)]
pub(crate) struct UploadedImage {
    file_name: String,
    content_type: String,
    data: Bytes,
}

/// Parsed admin painting form.
#[derive(Debug, Default)]
pub(crate) struct PaintingForm {
    fields: HashMap<String, String>,
    main_image: Option<UploadedImage>,
    additional_images: Vec<UploadedImage>,
    /// `None` when the form did not mention existing images at all.
    existing_additional: Option<Vec<String>>,
}

impl PaintingForm {
    /// `max_bytes` is the body limit the router enforces, quoted back on 413.
    pub(crate) async fn read(mut multipart: Multipart, max_bytes: usize) -> ApiResult<Self> {
        let mut form = Self::default();
        let multipart_error = |err| ApiError::from_multipart(err, max_bytes);

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);

            match name.as_str() {
                "main_image" | "additional_images" => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field.bytes().await.map_err(multipart_error)?;

                    // Browsers send an empty part for an untouched file input.
                    if data.is_empty() {
                        continue;
                    }
                    if !content_type.starts_with("image/") {
                        return Err(ApiError::invalid_input(format!(
                            "'{}' must be an image, got {}",
                            name, content_type
                        )));
                    }

                    let image = UploadedImage {
                        file_name: file_name.unwrap_or_else(|| "image".to_string()),
                        content_type,
                        data,
                    };
                    if name == "main_image" {
                        form.main_image = Some(image);
                    } else {
                        form.additional_images.push(image);
                    }
                }
                EXISTING_ADDITIONAL_FIELD => {
                    let url = field.text().await.map_err(multipart_error)?;
                    let kept = form.existing_additional.get_or_insert_with(Vec::new);
                    if !url.trim().is_empty() {
                        kept.push(url.trim().to_string());
                    }
                }
                "" => continue,
                _ => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim())
    }

    /// Overlay the submitted text fields onto `base`.
    ///
    /// Fields absent from the form keep the value from `base`. Image URLs are
    /// filled in separately once uploads succeed.
    pub(crate) fn apply_to(&self, mut draft: PaintingDraft) -> ApiResult<PaintingDraft> {
        if let Some(title) = self.text("title") {
            draft.title = title.to_string();
        }
        if let Some(slug) = self.text("slug") {
            draft.slug = slug.to_string();
        }
        if let Some(medium) = self.text("medium") {
            draft.medium = medium.to_string();
        }
        if let Some(dimensions) = self.text("dimensions") {
            draft.dimensions = dimensions.to_string();
        }
        if let Some(description) = self.text("description") {
            draft.description = description.to_string();
        }
        if let Some(year) = self.text("year") {
            draft.year = if year.is_empty() {
                None
            } else {
                Some(
                    year.parse()
                        .map_err(|_| ApiError::invalid_format("year", "a whole number"))?,
                )
            };
        }
        if let Some(status) = self.text("status") {
            draft.status = status.parse::<PaintingStatus>()?;
        }
        if let Some(price) = self.text("price") {
            draft.price = if price.is_empty() {
                None
            } else {
                Some(
                    price
                        .replace(',', "")
                        .parse()
                        .map_err(|_| ApiError::invalid_format("price", "a number"))?,
                )
            };
        }
        if let Some(featured) = self.text("is_featured_home") {
            draft.is_featured_home = parse_checkbox(featured);
        }
        if let Some(kept) = &self.existing_additional {
            draft.additional_image_urls = kept.clone();
        }
        Ok(draft)
    }
}

fn parse_checkbox(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

// ============================================================================
// UPLOADS
// ============================================================================

async fn upload_image(
    objects: &dyn ObjectStore,
    path: &str,
    image: &UploadedImage,
) -> ApiResult<String> {
    let result = objects
        .upload(path, image.data.clone(), &image.content_type)
        .await;

    if let Some(metrics) = metrics() {
        metrics.record_image_upload(objects.backend_name(), result.is_ok());
    }
    match result {
        Ok(url) => Ok(url),
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Image upload failed");
            Err(e.into())
        }
    }
}

/// Upload the form's images one after another and point `draft` at them.
///
/// The first failure aborts; nothing has been written to the catalog yet.
async fn upload_form_images(
    objects: &dyn ObjectStore,
    form: &PaintingForm,
    draft: &mut PaintingDraft,
) -> ApiResult<()> {
    let millis = Utc::now().timestamp_millis();

    if let Some(image) = &form.main_image {
        let path = main_image_path(millis, &image.file_name);
        draft.main_image_url = upload_image(objects, &path, image).await?;
    }

    for (index, image) in form.additional_images.iter().enumerate() {
        let path = additional_image_path(millis, index, &image.file_name);
        let url = upload_image(objects, &path, image).await?;
        draft.additional_image_urls.push(url);
    }

    Ok(())
}

/// Validate `draft` as it will look after uploads, before anything is sent.
fn validate_before_upload(form: &PaintingForm, draft: &PaintingDraft) -> ApiResult<()> {
    let mut candidate = draft.clone();
    if let Some(image) = &form.main_image {
        candidate.main_image_url = image.file_name.clone();
    }
    if candidate.main_image_url.trim().is_empty() {
        return Err(ApiError::missing_field("main_image"));
    }
    candidate.validate()?;
    Ok(())
}

fn record_write<T>(operation: &str, result: &ApiResult<T>) {
    if let Some(metrics) = metrics() {
        metrics.record_admin_write(operation, result.is_ok());
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/admin/login - Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "Admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ApiError),
        (status = 401, description = "Invalid email or password", body = ApiError),
    ),
)]
pub async fn login(
    State(admins): State<Arc<dyn AdminStore>>,
    State(auth): State<Arc<AuthConfig>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if req.email.trim().is_empty() {
        return Err(ApiError::missing_field("email"));
    }
    if req.password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }

    let account = authenticate_admin(admins.as_ref(), &req.email, &req.password).await?;
    let token = issue_session_token(&auth, &account)?;

    tracing::info!(admin_id = %account.id, "Admin signed in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: auth.session_ttl_secs,
        email: account.email,
    }))
}

/// GET /api/admin/stats - Dashboard counts
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Catalog counts", body = AdminStatsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn stats(
    State(state): State<AppState>,
    AdminExtractor(_session): AdminExtractor,
) -> ApiResult<Json<AdminStatsResponse>> {
    let catalog = &state.catalog;
    let (total, available, featured) = tokio::try_join!(
        catalog.count_paintings(PaintingFilter::all()),
        catalog.count_paintings(PaintingFilter::with_status(PaintingStatus::Available)),
        catalog.count_paintings(PaintingFilter::featured()),
    )?;

    Ok(Json(AdminStatsResponse {
        total,
        available,
        featured,
    }))
}

/// GET /api/admin/paintings - Every painting, straight from the store
#[utoipa::path(
    get,
    path = "/api/admin/paintings",
    tag = "Admin",
    responses(
        (status = 200, description = "All paintings, newest first", body = AdminPaintingListResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_paintings(
    State(state): State<AppState>,
    AdminExtractor(_session): AdminExtractor,
) -> ApiResult<Json<AdminPaintingListResponse>> {
    let paintings = state.catalog.list_paintings().await?;
    let total = paintings.len();
    Ok(Json(AdminPaintingListResponse { paintings, total }))
}

/// GET /api/admin/paintings/{id} - One painting for the edit form
#[utoipa::path(
    get,
    path = "/api/admin/paintings/{id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "Painting ID"),
    ),
    responses(
        (status = 200, description = "Painting", body = Painting),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Painting not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_painting(
    State(state): State<AppState>,
    AdminExtractor(_session): AdminExtractor,
    Path(id): Path<PaintingId>,
) -> ApiResult<Json<Painting>> {
    let painting = state
        .catalog
        .get_painting(id)
        .await?
        .ok_or_else(|| ApiError::painting_not_found(id))?;
    Ok(Json(painting))
}

/// POST /api/admin/paintings - Create a painting from a multipart form
///
/// `main_image` is required. Images are uploaded before the record is
/// inserted; an upload failure leaves the catalog untouched.
#[utoipa::path(
    post,
    path = "/api/admin/paintings",
    tag = "Admin",
    request_body(content_type = "multipart/form-data", description = "Painting fields plus main_image and additional_images files"),
    responses(
        (status = 201, description = "Painting created", body = Painting),
        (status = 400, description = "Invalid form", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 409, description = "Slug already exists", body = ApiError),
        (status = 502, description = "Image upload failed", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_painting(
    State(state): State<AppState>,
    AdminExtractor(session): AdminExtractor,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let result = create_painting_inner(&state, multipart).await;
    record_write("create", &result);
    let painting = result?;

    state.cache.on_admin_write();
    tracing::info!(
        admin = %session.email,
        painting_id = %painting.id,
        slug = %painting.slug,
        "Painting created"
    );

    Ok((StatusCode::CREATED, Json(painting)))
}

async fn create_painting_inner(state: &AppState, multipart: Multipart) -> ApiResult<Painting> {
    let form = PaintingForm::read(multipart, state.config.max_upload_bytes).await?;
    if form.main_image.is_none() {
        return Err(ApiError::missing_field("main_image"));
    }

    let mut draft = form.apply_to(PaintingDraft::default())?;
    validate_before_upload(&form, &draft)?;

    upload_form_images(state.objects.as_ref(), &form, &mut draft).await?;
    draft.validate()?;

    Ok(state.catalog.insert_painting(&draft).await?)
}

/// PUT /api/admin/paintings/{id} - Edit a painting from a multipart form
///
/// Fields left out keep their current value. A new `main_image` replaces the
/// old one; `existing_additional_image_urls` lists the additional images to
/// keep, and new `additional_images` are appended after them.
#[utoipa::path(
    put,
    path = "/api/admin/paintings/{id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "Painting ID"),
    ),
    request_body(content_type = "multipart/form-data", description = "Changed painting fields and images"),
    responses(
        (status = 200, description = "Painting updated", body = Painting),
        (status = 400, description = "Invalid form", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Painting not found", body = ApiError),
        (status = 409, description = "Slug already exists", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_painting(
    State(state): State<AppState>,
    AdminExtractor(session): AdminExtractor,
    Path(id): Path<PaintingId>,
    multipart: Multipart,
) -> ApiResult<Json<Painting>> {
    let result = update_painting_inner(&state, id, multipart).await;
    record_write("update", &result);
    let painting = result?;

    state.cache.on_admin_write();
    tracing::info!(
        admin = %session.email,
        painting_id = %painting.id,
        status = %painting.status,
        "Painting updated"
    );

    Ok(Json(painting))
}

async fn update_painting_inner(
    state: &AppState,
    id: PaintingId,
    multipart: Multipart,
) -> ApiResult<Painting> {
    let existing = state
        .catalog
        .get_painting(id)
        .await?
        .ok_or_else(|| ApiError::painting_not_found(id))?;

    let form = PaintingForm::read(multipart, state.config.max_upload_bytes).await?;
    let mut draft = form.apply_to(existing.to_draft())?;
    validate_before_upload(&form, &draft)?;

    upload_form_images(state.objects.as_ref(), &form, &mut draft).await?;
    draft.validate()?;

    Ok(state.catalog.update_painting(id, &draft).await?)
}

/// DELETE /api/admin/paintings/{id} - Remove a painting
#[utoipa::path(
    delete,
    path = "/api/admin/paintings/{id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "Painting ID"),
    ),
    responses(
        (status = 204, description = "Painting deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Painting not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_painting(
    State(state): State<AppState>,
    AdminExtractor(session): AdminExtractor,
    Path(id): Path<PaintingId>,
) -> ApiResult<StatusCode> {
    let result: ApiResult<()> = state.catalog.delete_painting(id).await.map_err(Into::into);
    record_write("delete", &result);
    result?;

    state.cache.on_admin_write();
    tracing::info!(admin = %session.email, painting_id = %id, "Painting deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/cache/invalidate - Drop the public catalog snapshot
#[utoipa::path(
    post,
    path = "/api/admin/cache/invalidate",
    tag = "Admin",
    responses(
        (status = 200, description = "Snapshot dropped", body = CacheInvalidatedResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn invalidate_cache(
    State(state): State<AppState>,
    AdminExtractor(session): AdminExtractor,
) -> Json<CacheInvalidatedResponse> {
    state.cache.invalidate();
    let stats = state.cache.stats();
    tracing::info!(admin = %session.email, "Catalog cache invalidated");

    Json(CacheInvalidatedResponse {
        invalidated: true,
        hits: stats.hits,
        misses: stats.misses,
        refresh_failures: stats.refresh_failures,
    })
}

// ============================================================================
// ROUTERS
// ============================================================================

/// Routes reachable without a session.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Routes that require a session. The caller layers the auth middleware.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/paintings", get(list_paintings).post(create_painting))
        .route(
            "/paintings/:id",
            get(get_painting)
                .put(update_painting)
                .delete(delete_painting),
        )
        .route("/cache/invalidate", post(invalidate_cache))
}
