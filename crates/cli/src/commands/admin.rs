//! Admin user bootstrap.
//!
//! Creates an account with the admin role, already verified, so the first
//! admin does not need a working SMTP setup to get into the panel.

use emberline_core::{Email, Role};
use emberline_server::db::users::{NewUser, UserRepository};
use emberline_server::services::auth::hash_password;

use super::migrate::CommandError;

/// Create an admin user.
///
/// # Errors
///
/// Returns `CommandError` if the email is invalid, the password cannot be
/// hashed, or the insert fails (including an already-registered email).
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let email = Email::parse(email)
        .map_err(emberline_server::services::auth::AuthError::InvalidEmail)?;
    let password_hash = hash_password(password)?;

    let pool = super::connect().await?;
    let repo = UserRepository::new(&pool);

    let user = repo
        .create(NewUser {
            name,
            email: &email,
            password_hash: &password_hash,
            verification: None,
            role: Role::Admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "admin user created");
    Ok(())
}
