//! Order route handlers: checkout, the customer's own orders, and the
//! admin order surface.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use emberline_core::{OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth};
use crate::models::Order;
use crate::services::checkout::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order_number: String,
}

/// `POST /api/orders/send-order-email`
///
/// The checkout submission: validates the shipping form and cart snapshot,
/// persists the order, emails the merchant (best-effort), and clears the
/// stored cart. Signing in is optional; a valid token links the order to
/// the account.
pub async fn checkout(
    State(state): State<AppState>,
    OptionalAuth(claims): OptionalAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let service = CheckoutService::new(state.pool(), state.email());
    let order = service
        .submit(request, claims.map(|c| c.sub))
        .await?;

    tracing::info!(order_number = %order.order_number, "order placed");

    Ok(Json(CheckoutResponse {
        message: "Order placed successfully.".to_string(),
        order_number: order.order_number,
    }))
}

/// `GET /api/orders/my`
///
/// The authenticated customer's own orders only.
pub async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_user(claims.sub)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/orders` (admin)
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}` (admin)
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("order".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `PUT /api/orders/{id}/status` (admin)
///
/// Only the status may change after creation, and only forward; the line
/// snapshot and total are immutable.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());

    let mut order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    if !order.status.can_transition_to(req.status) {
        return Err(AppError::Validation(format!(
            "cannot move order from {} to {}",
            order.status, req.status
        )));
    }

    repo.update_status(id, req.status).await?;
    tracing::info!(
        order_id = %id,
        from = %order.status,
        to = %req.status,
        admin = %claims.email,
        "order status updated"
    );

    order.status = req.status;
    Ok(Json(order))
}

/// `DELETE /api/orders/{id}` (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    let deleted = OrderRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("order".to_string()));
    }
    tracing::info!(order_id = %id, admin = %claims.email, "order deleted");

    Ok(StatusCode::NO_CONTENT)
}
