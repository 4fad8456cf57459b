//! User account record.

use chrono::{DateTime, Utc};
use common::{Role, UserId};
use serde::{Deserialize, Serialize};

/// A registered user account.
///
/// `password_hash` is an argon2 PHC string. The HTTP layer never returns
/// this record directly; it maps to a sanitized response type instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Login email, unique across the platform.
    pub email: String,

    /// Contact number.
    pub mobile: String,

    /// The user's role.
    pub role: Role,

    /// Argon2 hash of the login password.
    pub password_hash: String,

    /// Deactivated accounts cannot authenticate.
    pub is_active: bool,

    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user account.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        mobile: impl Into<String>,
        role: Role,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            mobile: mobile.into(),
            role,
            password_hash: password_hash.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
