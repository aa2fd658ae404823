//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use emberline_core::{Email, Role, UserId};

/// A storefront user.
///
/// The password hash and verification token never leave the repository
/// layer; this type is safe to serialize into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Role gating the admin surface.
    pub role: Role,
    /// Whether the email has been verified. Login requires this.
    pub email_verified: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
