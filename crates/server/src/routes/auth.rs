//! Auth route handlers.

use axum::{Json, extract::Path, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use emberline_core::UserId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: UserId,
}

/// `POST /api/auth/register`
///
/// Creates an unverified account and dispatches the verification email.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let auth = AuthService::new(state.pool(), state.email());
    let user = auth.register(&req.name, &req.email, &req.password).await?;

    tracing::info!(user_id = %user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registered. Check your email to verify your account.".to_string(),
            user_id: user.id,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// `POST /api/auth/login`
///
/// Verifies credentials and issues a signed bearer token. An unverified
/// account fails with a distinct error so clients can offer a resend.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.pool(), state.email());
    let user = auth.login(&req.email, &req.password).await?;

    let token = state.tokens().issue(&user);

    Ok(Json(LoginResponse { token, user }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `GET /api/auth/verify-email/{token}`
///
/// Single-use: redeeming the token clears it.
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), state.email());
    let user = auth.verify_email(&token).await?;

    tracing::info!(user_id = %user.id, "email verified");

    Ok(Json(MessageResponse {
        message: "Email verified. You can now log in.".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// `POST /api/auth/resend-verification`
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), state.email());
    auth.resend_verification(&req.email).await?;

    Ok(Json(MessageResponse {
        message: "Verification email sent.".to_string(),
    }))
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<User>> {
    let user = crate::db::users::UserRepository::new(state.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(Json(user))
}
