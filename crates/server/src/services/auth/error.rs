//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] emberline_core::EmailError),

    /// Required registration fields were empty.
    #[error("missing required fields: {0}")]
    MissingFields(String),

    /// Email is already registered.
    #[error("email is already registered")]
    DuplicateEmail,

    /// Wrong email or password. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Credentials are correct but the email has not been verified yet.
    #[error("email not verified")]
    EmailNotVerified,

    /// Verification token is unknown, already used, or expired.
    #[error("invalid or expired verification token")]
    InvalidOrExpiredToken,

    /// No account with this email.
    #[error("user not found")]
    UserNotFound,

    /// The account's email is already verified.
    #[error("email is already verified")]
    AlreadyVerified,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
