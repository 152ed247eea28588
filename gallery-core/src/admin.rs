//! Admin accounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Contact address shown when none is configured.
pub const DEFAULT_ADMIN_EMAIL: &str = "revanthacharya9481@gmail.com";

/// An account allowed to use the admin API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub id: Uuid,
    /// Always stored lowercase.
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl AdminAccount {
    pub fn new(email: &str, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
        }
    }
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
