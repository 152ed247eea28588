//! Authentication Module
//!
//! Admin authentication for the gallery API:
//! 1. Password verification against argon2 PHC hashes stored with each account
//! 2. Signed JWT session tokens (via Authorization: Bearer header)
//!
//! Unknown emails and wrong passwords are reported identically.

use crate::error::{ApiError, ApiResult};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use gallery_core::{normalize_email, AdminAccount, AuthError, ConfigError};
use gallery_storage::AdminStore;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock abstraction for session time validation.
///
/// Expiry is checked here rather than inside `jsonwebtoken`, so tests can pin
/// the current time.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// Test clock helpers for common scenarios.
#[cfg(test)]
pub mod test_clocks {
    use super::FixedClock;

    /// 2025-01-01 00:00:00 UTC
    pub fn valid() -> FixedClock {
        FixedClock(1735689600)
    }

    /// 2030-01-01 00:00:00 UTC - every test session has expired by then
    pub fn future() -> FixedClock {
        FixedClock(1893456000)
    }
}

// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

/// Session signing secret that never shows up in logs.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Create a new JWT secret with validation.
    ///
    /// # Errors
    /// Returns error if the secret is empty.
    pub fn new(secret: String) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "jwt_secret".to_string(),
            });
        }
        Ok(Self(SecretString::from(secret)))
    }

    /// Expose the secret value (only for signing and verification).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify session tokens.
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (default: HS256)
    pub jwt_algorithm: Algorithm,

    /// Session lifetime in seconds (default: 8 hours)
    pub session_ttl_secs: i64,

    /// Clock skew tolerance in seconds (default: 60)
    pub jwt_clock_skew_secs: i64,

    /// Clock for session time validation (injected for testing)
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: build_jwt_secret(String::new()),
            jwt_algorithm: Algorithm::HS256,
            session_ttl_secs: 8 * 3600,
            jwt_clock_skew_secs: 60,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `GALLERY_JWT_SECRET`: Session signing secret
    /// - `GALLERY_SESSION_TTL_SECS`: Session lifetime (default: 28800)
    /// - `GALLERY_JWT_CLOCK_SKEW_SECS`: Clock skew tolerance (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret_str = std::env::var("GALLERY_JWT_SECRET").unwrap_or_default();

        Self {
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: defaults.jwt_algorithm,
            session_ttl_secs: std::env::var("GALLERY_SESSION_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.session_ttl_secs),
            jwt_clock_skew_secs: std::env::var("GALLERY_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jwt_clock_skew_secs),
            clock: defaults.clock,
        }
    }

    /// Configuration signing with `secret`; everything else default.
    pub fn with_secret(secret: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret: JwtSecret::new(secret.to_string())?,
            ..Self::default()
        })
    }

    /// Refuse insecure secrets when `GALLERY_ENVIRONMENT` is production.
    ///
    /// Outside production the same problems are only logged.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        let is_production = crate::config::is_production_environment();

        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(
                    "Cannot start server in production with insecure JWT secret. \
                     Set GALLERY_JWT_SECRET to a secure value.",
                ));
            }
            tracing::warn!(
                "SECURITY WARNING: Using insecure default JWT secret. \
                 Set GALLERY_JWT_SECRET to a random value of at least 32 characters \
                 before deploying."
            );
        } else if self.jwt_secret.len() < 32 {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least 32 characters long.",
                    self.jwt_secret.len()
                )));
            }
            tracing::warn!(
                chars = self.jwt_secret.len(),
                "SECURITY WARNING: JWT secret is short. Use at least 32 characters."
            );
        }

        Ok(())
    }
}

fn build_jwt_secret(secret_str: String) -> JwtSecret {
    let normalized = if secret_str.trim().is_empty() {
        INSECURE_DEFAULT_SECRET.to_string()
    } else {
        secret_str
    };

    match JwtSecret::new(normalized) {
        Ok(secret) => secret,
        Err(_) => JwtSecret(SecretString::from(INSECURE_DEFAULT_SECRET.to_string())),
    }
}

// ============================================================================
// PASSWORD HASHING
// ============================================================================

/// Hash a password into an argon2id PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::HashingFailed {
        reason: e.to_string(),
    })?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingFailed {
            reason: e.to_string(),
        })
}

/// Check a password against a stored PHC string.
///
/// A malformed stored hash is an error; a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AuthError::HashingFailed {
        reason: format!("stored hash is not a valid PHC string: {}", e),
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// ============================================================================
// SESSION CLAIMS
// ============================================================================

/// Claims carried by an admin session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Admin account id
    pub sub: String,

    /// Admin email at the time of login
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(account: &AdminAccount, ttl_secs: i64, clock: &dyn JwtClock) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            sub: account.id.to_string(),
            email: account.email.clone(),
            iat: now,
            exp: now + ttl_secs,
        }
    }

    pub fn is_expired(&self, clock: &dyn JwtClock) -> bool {
        self.exp < clock.now_epoch_secs()
    }
}

/// Authenticated admin, injected into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub admin_id: Uuid,
    pub email: String,
}

// ============================================================================
// SESSION TOKENS
// ============================================================================

fn validate_claim_times(now: i64, exp: i64, leeway_secs: i64) -> ApiResult<()> {
    if exp < now - leeway_secs {
        return Err(ApiError::token_expired());
    }
    Ok(())
}

/// Sign a session token for `account`.
pub fn issue_session_token(config: &AuthConfig, account: &AdminAccount) -> ApiResult<String> {
    let claims = Claims::new(account, config.session_ttl_secs, &*config.clock);

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// Verify a session token's signature and expiry.
///
/// Signature checking is left to `jsonwebtoken`; expiry uses the configured clock.
pub fn validate_session_token(config: &AuthConfig, token: &str) -> ApiResult<AdminSession> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;

    let now = config.clock.now_epoch_secs();
    if now < 0 {
        tracing::error!(
            timestamp = now,
            "System clock returned pre-epoch time - server time is broken"
        );
        return Err(ApiError::internal_error("Server time configuration error"));
    }

    validate_claim_times(now, claims.exp, config.jwt_clock_skew_secs)?;

    let admin_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::invalid_token("Token subject is not an admin id"))?;

    Ok(AdminSession {
        admin_id,
        email: claims.email,
    })
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> ApiResult<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::invalid_token("Authorization header must use Bearer scheme"))
}

// ============================================================================
// LOGIN
// ============================================================================

/// Hash checked when the email has no account, so both failures cost one
/// argon2 verification.
static UNKNOWN_ACCOUNT_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("unknown-account-placeholder").ok());

async fn verify_blocking(password: &str, hash: String) -> Result<bool, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::HashingFailed {
            reason: format!("verification task failed: {}", e),
        })?
}

/// Look up the account for `email` and verify `password` against it.
///
/// Argon2 runs on the blocking pool, for unknown emails too.
pub async fn authenticate_admin(
    store: &dyn AdminStore,
    email: &str,
    password: &str,
) -> ApiResult<AdminAccount> {
    let email = normalize_email(email);
    let Some(account) = store.find_admin_by_email(&email).await? else {
        if let Some(hash) = UNKNOWN_ACCOUNT_HASH.clone() {
            let _ = verify_blocking(password, hash).await;
        }
        tracing::info!(email = %email, "Rejected admin login");
        return Err(AuthError::InvalidCredentials.into());
    };

    let verified = verify_blocking(password, account.password_hash.clone()).await?;
    if !verified {
        tracing::info!(email = %email, "Rejected admin login");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(account)
}

// ============================================================================
// TESTS
// ============================================================================
