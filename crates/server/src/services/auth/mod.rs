//! Authentication service.
//!
//! Registration with email verification, login, and verification resend.
//! Accounts start unverified and cannot log in until the emailed token is
//! redeemed.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use sqlx::PgPool;

use emberline_core::{Email, Role};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;
use crate::services::email::{EmailService, generate_verification_token};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// How long a verification token stays redeemable.
const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

/// Authentication service.
///
/// Handles registration, email verification, and login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    email: &'a EmailService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService) -> Self {
        Self {
            users: UserRepository::new(pool),
            email,
        }
    }

    /// Register a new user.
    ///
    /// The account is created unverified with a 24-hour verification token,
    /// and a verification email is dispatched. A send failure is logged but
    /// does not fail registration - the user can ask for a resend.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if the name is empty,
    /// `AuthError::InvalidEmail` / `AuthError::WeakPassword` on invalid
    /// input, and `AuthError::DuplicateEmail` if the email is taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingFields("name".to_owned()));
        }

        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let token = generate_verification_token();
        let expires = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);

        let user = self
            .users
            .create(NewUser {
                name,
                email: &email,
                password_hash: &password_hash,
                verification: Some((&token, expires)),
                role: Role::Customer,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        // Best effort: a failed send must not fail registration.
        if let Err(e) = self
            .email
            .send_verification(&user.email, &user.name, &token)
            .await
        {
            tracing::warn!(error = %e, email = %user.email, "verification email failed to send");
        }

        Ok(user)
    }

    /// Redeem a verification token. Single-use: the token is cleared once
    /// the account is marked verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOrExpiredToken` if no account holds this
    /// token or its deadline has passed.
    pub async fn verify_email(&self, token: &str) -> Result<User, AuthError> {
        self.users
            .consume_verification_token(token)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or
    /// the password does not match, and `AuthError::EmailNotVerified` -
    /// distinct, so clients can offer a resend - when credentials are right
    /// but the account is not yet verified.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        // Only after the password checks out, so this error never leaks
        // whether a password was correct for someone else's account.
        if !user.email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        Ok(user)
    }

    /// Generate a fresh verification token and resend the email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown email and
    /// `AuthError::AlreadyVerified` when there is nothing to verify.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let token = generate_verification_token();
        let expires = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);
        self.users
            .set_verification_token(user.id, &token, expires)
            .await?;

        if let Err(e) = self
            .email
            .send_verification(&user.email, &user.name, &token)
            .await
        {
            tracing::warn!(error = %e, email = %user.email, "verification email failed to send");
        }

        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
