//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling via deadpool-postgres and the Postgres
//! implementations of [`CatalogStore`] and [`AdminStore`].

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use gallery_core::{
    AdminAccount, GalleryError, GalleryResult, Painting, PaintingDraft, PaintingFilter,
    PaintingId, StorageError,
};
use gallery_storage::{AdminStore, CatalogStore};
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::config::env_flag;
use crate::error::{ApiError, ApiResult};

/// Tables used by the gallery. Applied by [`PgStore::ensure_schema`].
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS paintings (
    id UUID PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    medium TEXT NOT NULL,
    dimensions TEXT NOT NULL DEFAULT '',
    year INTEGER,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'AVAILABLE'
        CHECK (status IN ('AVAILABLE', 'SOLD', 'NOT_FOR_SALE', 'RESERVED')),
    price NUMERIC(12, 2),
    main_image_url TEXT NOT NULL,
    additional_image_urls TEXT[] NOT NULL DEFAULT '{}',
    is_featured_home BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS paintings_created_at_idx ON paintings (created_at DESC);

CREATE TABLE IF NOT EXISTS admins (
    id UUID PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

const PAINTING_COLUMNS: &str = "id, slug, title, medium, dimensions, year, description, status, \
     price::float8 AS price, main_image_url, additional_image_urls, is_featured_home, \
     created_at, updated_at";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
    /// Create missing tables at startup
    pub auto_migrate: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "gallery".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
            auto_migrate: false,
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("GALLERY_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("GALLERY_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("GALLERY_DB_NAME").unwrap_or_else(|_| "gallery".to_string()),
            user: std::env::var("GALLERY_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("GALLERY_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("GALLERY_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("GALLERY_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            auto_migrate: env_flag("GALLERY_DB_AUTO_MIGRATE", false),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.connect_timeout = Some(self.timeout);

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(self.max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn query_failed(err: tokio_postgres::Error) -> GalleryError {
    tracing::error!(error = ?err, "Postgres query failed");
    StorageError::QueryFailed {
        reason: err.to_string(),
    }
    .into()
}

fn is_unique_violation(err: &tokio_postgres::Error) -> bool {
    err.code() == Some(&SqlState::UNIQUE_VIOLATION)
}

fn malformed(column: &str, err: impl std::fmt::Display) -> GalleryError {
    StorageError::MalformedRow {
        column: column.to_string(),
        reason: err.to_string(),
    }
    .into()
}

fn column<'a, T>(row: &'a Row, name: &str) -> GalleryResult<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name).map_err(|e| malformed(name, e))
}

/// Build a painting from a row selected with `PAINTING_COLUMNS`.
fn painting_from_row(row: &Row) -> GalleryResult<Painting> {
    let status: String = column(row, "status")?;
    let status = status.parse().map_err(|e| malformed("status", e))?;

    Ok(Painting {
        id: column(row, "id")?,
        slug: column(row, "slug")?,
        title: column(row, "title")?,
        medium: column(row, "medium")?,
        dimensions: column(row, "dimensions")?,
        year: column(row, "year")?,
        description: column(row, "description")?,
        status,
        price: column(row, "price")?,
        main_image_url: column(row, "main_image_url")?,
        additional_image_urls: column(row, "additional_image_urls")?,
        is_featured_home: column(row, "is_featured_home")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

// ============================================================================
// POSTGRES STORE
// ============================================================================

/// Postgres-backed catalog and admin store.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool_size", &self.pool_size())
            .finish()
    }
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    async fn get_conn(&self) -> GalleryResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            tracing::error!(error = ?e, "Connection pool error");
            StorageError::QueryFailed {
                reason: format!("connection pool: {}", e),
            }
            .into()
        })
    }

    /// Create the gallery tables if they do not exist.
    pub async fn ensure_schema(&self) -> GalleryResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA_SQL).await.map_err(query_failed)?;
        tracing::info!("Database schema verified");
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> GalleryResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(query_failed)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    #[instrument(skip(self))]
    async fn list_paintings(&self) -> GalleryResult<Vec<Painting>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {} FROM paintings ORDER BY created_at DESC",
            PAINTING_COLUMNS
        );
        let rows = conn.query(&sql, &[]).await.map_err(query_failed)?;
        rows.iter().map(painting_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn count_paintings(&self, filter: PaintingFilter) -> GalleryResult<u64> {
        let conn = self.get_conn().await?;
        let status = filter.status.map(|s| s.as_str().to_string());

        let row = conn
            .query_one(
                "SELECT COUNT(*) FROM paintings \
                 WHERE ($1::text IS NULL OR status = $1) \
                 AND ($2::bool IS NULL OR is_featured_home = $2)",
                &[&status, &filter.featured],
            )
            .await
            .map_err(query_failed)?;

        let count: i64 = column(&row, "count")?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self))]
    async fn get_painting(&self, id: PaintingId) -> GalleryResult<Option<Painting>> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT {} FROM paintings WHERE id = $1", PAINTING_COLUMNS);
        let row = conn.query_opt(&sql, &[&id]).await.map_err(query_failed)?;
        row.as_ref().map(painting_from_row).transpose()
    }

    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    async fn insert_painting(&self, draft: &PaintingDraft) -> GalleryResult<Painting> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "INSERT INTO paintings (id, slug, title, medium, dimensions, year, description, \
             status, price, main_image_url, additional_image_urls, is_featured_home) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::float8, $10, $11, $12) \
             RETURNING {}",
            PAINTING_COLUMNS
        );

        let row = conn
            .query_one(
                &sql,
                &[
                    &Uuid::now_v7(),
                    &draft.slug,
                    &draft.title,
                    &draft.medium,
                    &draft.dimensions,
                    &draft.year,
                    &draft.description,
                    &draft.status.as_str(),
                    &draft.price,
                    &draft.main_image_url,
                    &draft.additional_image_urls,
                    &draft.is_featured_home,
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StorageError::DuplicateSlug {
                        slug: draft.slug.clone(),
                    }
                    .into()
                } else {
                    query_failed(e)
                }
            })?;

        painting_from_row(&row)
    }

    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    async fn update_painting(
        &self,
        id: PaintingId,
        draft: &PaintingDraft,
    ) -> GalleryResult<Painting> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE paintings SET slug = $2, title = $3, medium = $4, dimensions = $5, \
             year = $6, description = $7, status = $8, price = $9::float8, \
             main_image_url = $10, additional_image_urls = $11, is_featured_home = $12, \
             updated_at = now() \
             WHERE id = $1 RETURNING {}",
            PAINTING_COLUMNS
        );

        let row = conn
            .query_opt(
                &sql,
                &[
                    &id,
                    &draft.slug,
                    &draft.title,
                    &draft.medium,
                    &draft.dimensions,
                    &draft.year,
                    &draft.description,
                    &draft.status.as_str(),
                    &draft.price,
                    &draft.main_image_url,
                    &draft.additional_image_urls,
                    &draft.is_featured_home,
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StorageError::DuplicateSlug {
                        slug: draft.slug.clone(),
                    }
                    .into()
                } else {
                    query_failed(e)
                }
            })?;

        match row {
            Some(row) => painting_from_row(&row),
            None => Err(StorageError::NotFound { id }.into()),
        }
    }

    #[instrument(skip(self))]
    async fn delete_painting(&self, id: PaintingId) -> GalleryResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM paintings WHERE id = $1", &[&id])
            .await
            .map_err(query_failed)?;

        if deleted == 0 {
            return Err(StorageError::NotFound { id }.into());
        }
        Ok(())
    }
}

#[async_trait]
impl AdminStore for PgStore {
    #[instrument(skip(self))]
    async fn find_admin_by_email(&self, email: &str) -> GalleryResult<Option<AdminAccount>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT id, email, password_hash FROM admins WHERE email = $1",
                &[&email],
            )
            .await
            .map_err(query_failed)?;

        row.map(|row| -> GalleryResult<AdminAccount> {
            Ok(AdminAccount {
                id: column(&row, "id")?,
                email: column(&row, "email")?,
                password_hash: column(&row, "password_hash")?,
            })
        })
        .transpose()
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn insert_admin(&self, account: &AdminAccount) -> GalleryResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO admins (id, email, password_hash) VALUES ($1, $2, $3)",
            &[&account.id, &account.email, &account.password_hash],
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::InsertFailed {
                    reason: format!("admin {} already exists", account.email),
                }
                .into()
            } else {
                query_failed(e)
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_config() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "gallery");
        assert_eq!(config.max_size, 16);
        assert!(!config.auto_migrate);
    }

    #[test]
    fn test_schema_covers_every_status() {
        for status in gallery_core::PaintingStatus::all() {
            assert!(SCHEMA_SQL.contains(&format!("'{}'", status.as_str())));
        }
    }

    #[test]
    fn test_price_is_selected_as_float() {
        assert!(PAINTING_COLUMNS.contains("price::float8 AS price"));
    }

    #[tokio::test]
    async fn test_pool_creation_does_not_connect() {
        // deadpool connects lazily; building the pool must not touch the network.
        let store = PgStore::from_config(&DbConfig {
            host: "127.0.0.1".to_string(),
            port: 9,
            ..DbConfig::default()
        });
        assert!(store.is_ok());
    }
}
