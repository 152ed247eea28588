//! API Configuration Module
//!
//! Server, catalog and object storage settings. Everything is loaded from
//! environment variables with defaults that work for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gallery_core::{ConfigError, GalleryResult, DEFAULT_ADMIN_EMAIL, DEFAULT_WHATSAPP_NUMBER};
use gallery_storage::{
    CacheConfig, FilesystemObjectStore, HttpObjectStore, ObjectStore, DEFAULT_STALENESS_WINDOW,
};
use secrecy::{ExposeSecret, SecretString};

/// Default cap on a single multipart upload request.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Read an environment flag. Accepts "true"/"1"/"yes" (case-insensitive).
pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

/// True when `GALLERY_ENVIRONMENT` names a production deployment.
pub fn is_production_environment() -> bool {
    std::env::var("GALLERY_ENVIRONMENT")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}

// ============================================================================
// GALLERY CONFIGURATION
// ============================================================================

/// Server and catalog settings.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Interface to bind.
    pub bind_host: String,
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Catalog Configuration
    // ========================================================================
    /// Number that purchase inquiries are sent to.
    pub whatsapp_number: String,

    /// Email of the admin account seeded at startup.
    pub admin_email: String,

    /// Argon2 PHC hash for the seeded admin. No account is seeded without it.
    pub admin_password_hash: Option<String>,

    /// How long a catalog snapshot is served before it is refetched.
    pub cache_ttl: Duration,

    /// Drop the catalog snapshot after every successful admin write.
    pub cache_invalidate_on_write: bool,

    /// Serve the last good snapshot when a refresh fails.
    pub cache_serve_stale: bool,

    /// Largest accepted admin upload request body.
    pub max_upload_bytes: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password_hash: None,
            cache_ttl: DEFAULT_STALENESS_WINDOW,
            cache_invalidate_on_write: false,
            cache_serve_stale: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl GalleryConfig {
    /// Create GalleryConfig from environment variables.
    ///
    /// Environment variables:
    /// - `GALLERY_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` / `GALLERY_API_PORT`: Listen port (default: 3000)
    /// - `GALLERY_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `GALLERY_ADMIN_WHATSAPP_NUMBER`: Inquiry recipient
    /// - `GALLERY_ADMIN_EMAIL`: Seed admin email
    /// - `GALLERY_ADMIN_PASSWORD_HASH`: Argon2 hash for the seed admin (see `hash-password`)
    /// - `GALLERY_CACHE_TTL_SECS`: Catalog staleness window (default: 300)
    /// - `GALLERY_CACHE_INVALIDATE_ON_WRITE`: "true" to refresh after admin writes
    /// - `GALLERY_CACHE_SERVE_STALE`: "true" to serve the last snapshot on failure
    /// - `GALLERY_MAX_UPLOAD_BYTES`: Upload request limit (default: 20 MiB)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_host = std::env::var("GALLERY_API_BIND").unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("GALLERY_API_PORT").ok())
        {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                value: raw.clone(),
                reason: "expected a port number".to_string(),
            })?,
            None => defaults.port,
        };

        let cors_origins = std::env::var("GALLERY_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("GALLERY_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let whatsapp_number = std::env::var("GALLERY_ADMIN_WHATSAPP_NUMBER")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.whatsapp_number);

        let admin_email = std::env::var("GALLERY_ADMIN_EMAIL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.admin_email);

        let cache_ttl = std::env::var("GALLERY_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let max_upload_bytes = std::env::var("GALLERY_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_max_age_secs,
            whatsapp_number,
            admin_email,
            admin_password_hash: std::env::var("GALLERY_ADMIN_PASSWORD_HASH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            cache_ttl,
            cache_invalidate_on_write: env_flag("GALLERY_CACHE_INVALIDATE_ON_WRITE", false),
            cache_serve_stale: env_flag("GALLERY_CACHE_SERVE_STALE", false),
            max_upload_bytes,
        })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "GALLERY_API_BIND".to_string(),
                value: addr.clone(),
                reason: e.to_string(),
            })
    }

    /// Catalog cache settings derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_staleness_window(self.cache_ttl)
            .with_serve_stale_on_error(self.cache_serve_stale)
            .with_invalidate_on_admin_write(self.cache_invalidate_on_write)
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|allowed| allowed == origin)
    }
}

// ============================================================================
// OBJECT STORAGE CONFIGURATION
// ============================================================================

/// Which object storage backend receives uploaded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local directory, served by this process under `/media`.
    Filesystem,
    /// Hosted storage REST API.
    Http,
}

/// Object storage settings.
#[derive(Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub root: PathBuf,
    pub public_base_url: String,
    pub url: Option<String>,
    pub bucket: String,
    pub key: Option<SecretString>,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("root", &self.root)
            .field("public_base_url", &self.public_base_url)
            .field("url", &self.url)
            .field("bucket", &self.bucket)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            root: PathBuf::from("./media"),
            public_base_url: "/media".to_string(),
            url: None,
            bucket: "paintings".to_string(),
            key: None,
        }
    }
}

impl StorageConfig {
    /// Create StorageConfig from environment variables.
    ///
    /// Environment variables:
    /// - `GALLERY_STORAGE_BACKEND`: "fs" (default) or "http"
    /// - `GALLERY_STORAGE_ROOT`: Directory for the filesystem backend
    /// - `GALLERY_STORAGE_PUBLIC_BASE_URL`: URL prefix for filesystem objects
    /// - `GALLERY_STORAGE_URL`: Hosted storage base URL
    /// - `GALLERY_STORAGE_BUCKET`: Hosted bucket name (default: paintings)
    /// - `GALLERY_STORAGE_KEY`: Hosted service key
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let backend = match std::env::var("GALLERY_STORAGE_BACKEND")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            Ok("fs") | Ok("filesystem") | Err(_) => StorageBackend::Filesystem,
            Ok("http") => StorageBackend::Http,
            Ok(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "GALLERY_STORAGE_BACKEND".to_string(),
                    value: other.to_string(),
                    reason: "expected 'fs' or 'http'".to_string(),
                })
            }
        };

        Ok(Self {
            backend,
            root: std::env::var("GALLERY_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.root),
            public_base_url: std::env::var("GALLERY_STORAGE_PUBLIC_BASE_URL")
                .unwrap_or(defaults.public_base_url),
            url: std::env::var("GALLERY_STORAGE_URL").ok(),
            bucket: std::env::var("GALLERY_STORAGE_BUCKET").unwrap_or(defaults.bucket),
            key: std::env::var("GALLERY_STORAGE_KEY")
                .ok()
                .filter(|s| !s.is_empty())
                .map(SecretString::from),
        })
    }

    /// Construct the configured backend.
    pub async fn build(&self) -> GalleryResult<Arc<dyn ObjectStore>> {
        match self.backend {
            StorageBackend::Filesystem => {
                let store = FilesystemObjectStore::new(&self.root, &self.public_base_url).await?;
                Ok(Arc::new(store))
            }
            StorageBackend::Http => {
                let url = self.url.as_ref().ok_or_else(|| ConfigError::MissingRequired {
                    field: "GALLERY_STORAGE_URL".to_string(),
                })?;
                let key = self.key.as_ref().ok_or_else(|| ConfigError::MissingRequired {
                    field: "GALLERY_STORAGE_KEY".to_string(),
                })?;
                let store = HttpObjectStore::new(url, &self.bucket, key.expose_secret())?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Directory to expose under `/media`, if the filesystem backend is used.
    pub fn served_root(&self) -> Option<&PathBuf> {
        match self.backend {
            StorageBackend::Filesystem => Some(&self.root),
            StorageBackend::Http => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lock_env, EnvVarGuard};

    #[test]
    fn test_default_config() {
        let config = GalleryConfig::default();
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.whatsapp_number, "919663608903");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(!config.cache_invalidate_on_write);
        assert!(!config.cache_serve_stale);
    }

    #[test]
    fn test_from_env_reads_cache_settings() -> Result<(), ConfigError> {
        let _lock = lock_env();
        let _ttl = EnvVarGuard::set("GALLERY_CACHE_TTL_SECS", Some("60"));
        let _stale = EnvVarGuard::set("GALLERY_CACHE_SERVE_STALE", Some("TRUE"));
        let _inv = EnvVarGuard::set("GALLERY_CACHE_INVALIDATE_ON_WRITE", None);
        let _port = EnvVarGuard::set("PORT", None);
        let _api_port = EnvVarGuard::set("GALLERY_API_PORT", Some("8080"));

        let config = GalleryConfig::from_env()?;
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert!(config.cache_serve_stale);
        assert!(!config.cache_invalidate_on_write);
        assert_eq!(config.port, 8080);

        let cache = config.cache_config();
        assert_eq!(cache.staleness_window, Duration::from_secs(60));
        assert!(cache.serve_stale_on_error);
        Ok(())
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let _lock = lock_env();
        let _port = EnvVarGuard::set("PORT", Some("not-a-port"));

        let err = GalleryConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "PORT"));
    }

    #[test]
    fn test_blank_whatsapp_number_falls_back() -> Result<(), ConfigError> {
        let _lock = lock_env();
        let _port = EnvVarGuard::set("PORT", None);
        let _number = EnvVarGuard::set("GALLERY_ADMIN_WHATSAPP_NUMBER", Some("  "));

        let config = GalleryConfig::from_env()?;
        assert_eq!(config.whatsapp_number, DEFAULT_WHATSAPP_NUMBER);
        Ok(())
    }

    #[test]
    fn test_origin_allowed() {
        let mut config = GalleryConfig::default();
        assert!(config.is_origin_allowed("http://localhost:5173"));

        config.cors_origins = vec!["https://gallery.example".to_string()];
        assert!(config.is_origin_allowed("https://gallery.example"));
        assert!(!config.is_origin_allowed("https://evil.example"));
    }

    #[test]
    fn test_storage_backend_parsing() -> Result<(), ConfigError> {
        let _lock = lock_env();

        let _backend = EnvVarGuard::set("GALLERY_STORAGE_BACKEND", Some("http"));
        assert_eq!(StorageConfig::from_env()?.backend, StorageBackend::Http);

        let _backend = EnvVarGuard::set("GALLERY_STORAGE_BACKEND", Some("s3"));
        assert!(StorageConfig::from_env().is_err());
        Ok(())
    }

    #[test]
    fn test_storage_debug_redacts_key() {
        let config = StorageConfig {
            key: Some(SecretString::from("service-role-key".to_string())),
            ..StorageConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("service-role-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_http_backend_requires_url_and_key() {
        let config = StorageConfig {
            backend: StorageBackend::Http,
            ..StorageConfig::default()
        };
        assert!(config.build().await.is_err());
        assert!(config.served_root().is_none());
    }
}
