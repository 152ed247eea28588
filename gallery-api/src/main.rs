//! Gallery API Server Entry Point
//!
//! Bootstraps configuration, connects the Postgres store, seeds the admin
//! account and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use gallery_api::{
    create_router, ApiError, ApiResult, AppState, AuthConfig, DbConfig, GalleryConfig, PgStore,
    StorageConfig,
};
use gallery_core::AdminAccount;
use gallery_storage::AdminStore;

use gallery_api::telemetry::{init_tracer, TelemetryConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let config = GalleryConfig::from_env()?;
    let auth_config = AuthConfig::from_env();
    auth_config.validate_for_production()?;
    let storage_config = StorageConfig::from_env()?;
    let db_config = DbConfig::from_env();

    let store = Arc::new(PgStore::from_config(&db_config)?);
    if db_config.auto_migrate {
        store.ensure_schema().await?;
        tracing::info!("Database schema ensured");
    }
    seed_admin(store.as_ref(), &config).await?;

    let objects = storage_config.build().await?;
    tracing::info!(backend = objects.backend_name(), "Object storage ready");

    let addr = config.bind_addr()?;
    let state = AppState::new(store.clone(), store, objects, auth_config, config);
    let app: Router = create_router(state, storage_config.served_root().map(|p| p.as_path()));

    tracing::info!(
        %addr,
        service = %telemetry_config.service_name,
        version = %telemetry_config.service_version,
        "Starting gallery API server"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Create the configured admin account if it does not exist yet.
///
/// Without `GALLERY_ADMIN_PASSWORD_HASH` nothing is created and existing
/// accounts are left alone.
async fn seed_admin(store: &dyn AdminStore, config: &GalleryConfig) -> ApiResult<()> {
    let Some(hash) = config.admin_password_hash.as_deref() else {
        tracing::warn!(
            email = %config.admin_email,
            "GALLERY_ADMIN_PASSWORD_HASH not set; admin account not seeded"
        );
        return Ok(());
    };

    let account = AdminAccount::new(&config.admin_email, hash);
    if store.find_admin_by_email(&account.email).await?.is_some() {
        tracing::debug!(email = %account.email, "Admin account already present");
        return Ok(());
    }

    store.insert_admin(&account).await?;
    tracing::info!(email = %account.email, "Seeded admin account");
    Ok(())
}
