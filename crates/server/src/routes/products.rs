//! Catalog route handlers.
//!
//! Reads are public; writes require the admin role. List responses carry the
//! full collection - clients filter and sort locally.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use emberline_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductInput};
use crate::state::AppState;

/// `GET /api/products`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("product".to_string()))
}

/// `POST /api/products` (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    validate(&input)?;

    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, admin = %claims.email, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}` (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    validate(&input)?;

    let product = ProductRepository::new(state.pool())
        .update(id, &input)
        .await?;
    tracing::info!(product_id = %id, admin = %claims.email, "product updated");

    Ok(Json(product))
}

/// `DELETE /api/products/{id}` (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("product".to_string()));
    }
    tracing::info!(product_id = %id, admin = %claims.email, "product deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn validate(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("product name is required".to_string()));
    }
    if input.price.is_sign_negative() {
        return Err(AppError::Validation(
            "product price cannot be negative".to_string(),
        ));
    }
    Ok(())
}
