//! OpenAPI Specification for the Gallery API
//!
//! Generated by utoipa from the route annotations and response types.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{CacheHealth, ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{admin, catalog, health, inquiry};
use crate::telemetry::metrics;
use crate::types::*;

use gallery_core::{Painting, PaintingDraft, PaintingStatus, PurchaseControl};

/// OpenAPI document for the Gallery API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gallery API",
        version = "0.1.0",
        description = "Painting catalog, purchase inquiries and admin management for an artist's gallery site",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Catalog", description = "Public painting catalog served through the cache"),
        (name = "Inquiry", description = "Purchase inquiry deep links"),
        (name = "Admin", description = "Authenticated catalog management"),
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === Public ===
        catalog::home,
        catalog::list_paintings,
        catalog::get_painting,
        inquiry::inquire,

        // === Admin ===
        admin::login,
        admin::stats,
        admin::list_paintings,
        admin::get_painting,
        admin::create_painting,
        admin::update_painting,
        admin::delete_painting,
        admin::invalidate_cache,

        // === Operations ===
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            ApiError,
            ErrorCode,
            Painting,
            PaintingDraft,
            PaintingStatus,
            PurchaseControl,
            CatalogStatus,
            PaintingSummary,
            CatalogResponse,
            HomeResponse,
            PaintingDetailResponse,
            LoginRequest,
            LoginResponse,
            AdminStatsResponse,
            AdminPaintingListResponse,
            CacheInvalidatedResponse,
            HealthResponse,
            HealthStatus,
            HealthDetails,
            ComponentHealth,
            CacheHealth,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the admin session bearer scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Admin session token from /api/admin/login"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Gallery API");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 5);

        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("PaintingDetailResponse"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/api/home",
            "/api/paintings",
            "/api/paintings/{slug}",
            "/inquire/{slug}",
            "/api/admin/login",
            "/api/admin/paintings/{id}",
            "/health/ready",
            "/metrics",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        let parsed: serde_json::Value =
            serde_json::from_str(&json).map_err(|e| format!("Invalid JSON: {}", e))?;
        assert!(parsed.get("openapi").is_some());
        Ok(())
    }
}
