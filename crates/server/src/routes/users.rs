//! User admin route handlers.
//!
//! Roles change only here, through another admin's explicit action.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use emberline_core::{Role, UserId};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::state::AppState;

/// `GET /api/users` (admin)
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// `PUT /api/users/{id}/role` (admin)
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<User>> {
    // Admins cannot silently demote themselves into a locked-out panel.
    if claims.sub == id && req.role != Role::Admin {
        return Err(AppError::Validation(
            "cannot remove your own admin role".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .update_role(id, req.role)
        .await?;
    tracing::info!(user_id = %id, role = %req.role, admin = %claims.email, "role updated");

    Ok(Json(user))
}

/// `DELETE /api/users/{id}` (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    if claims.sub == id {
        return Err(AppError::Validation(
            "cannot delete your own account".to_string(),
        ));
    }

    let deleted = UserRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("user".to_string()));
    }
    tracing::info!(user_id = %id, admin = %claims.email, "user deleted");

    Ok(StatusCode::NO_CONTENT)
}
