//! Cart route handlers.
//!
//! The cart is keyed by an opaque session token the client holds (and
//! persists locally). Every mutating handler loads the stored snapshot,
//! applies the pure cart operation, and then writes the snapshot back.
//!
//! The write-back is best-effort: a storage failure is logged and swallowed,
//! never surfaced, because a lost cart is recoverable by re-adding items and
//! must not block the caller. Concurrent writers to the same session are
//! last-write-wins.

use axum::{Json, extract::Path, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use emberline_core::{Cart, CartLine, CartLineInput};

use crate::db::carts::CartStore;
use crate::error::Result;
use crate::state::AppState;

/// Cart response: the lines plus the derived totals, recomputed on every
/// response so they can never drift from the line data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub item_count: u32,
    pub subtotal: Decimal,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        Self {
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
            lines: cart.lines().to_vec(),
        }
    }
}

/// Load, mutate, best-effort save, respond.
async fn mutate(
    state: &AppState,
    session: &str,
    op: impl FnOnce(&mut Cart),
) -> Result<Json<CartView>> {
    let store = CartStore::new(state.pool());

    let mut cart = store.load(session).await?;
    op(&mut cart);

    if let Err(e) = store.save(session, &cart).await {
        tracing::warn!(error = %e, "cart snapshot write failed; continuing");
    }

    Ok(Json(CartView::from(cart)))
}

/// `GET /api/cart/{session}`
pub async fn show(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<CartView>> {
    let cart = CartStore::new(state.pool()).load(&session).await?;
    Ok(Json(CartView::from(cart)))
}

/// `POST /api/cart/{session}/items`
///
/// Adds an item; a line with the same `(product_id, variant)` merges by
/// incrementing its quantity.
pub async fn add(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(input): Json<CartLineInput>,
) -> Result<Json<CartView>> {
    mutate(&state, &session, |cart| cart.add_item(input)).await
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: String,
    #[serde(default)]
    pub variant: Option<String>,
    pub quantity: u32,
}

/// `PUT /api/cart/{session}/items`
///
/// Sets a line's quantity; zero removes the line.
pub async fn update(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    mutate(&state, &session, |cart| {
        cart.set_quantity(&req.product_id, req.variant.as_deref(), req.quantity);
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct RemoveLineRequest {
    pub product_id: String,
    #[serde(default)]
    pub variant: Option<String>,
}

/// `DELETE /api/cart/{session}/items`
///
/// Removes a line; a miss is a no-op, not an error.
pub async fn remove(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(req): Json<RemoveLineRequest>,
) -> Result<Json<CartView>> {
    mutate(&state, &session, |cart| {
        cart.remove_item(&req.product_id, req.variant.as_deref());
    })
    .await
}

/// `DELETE /api/cart/{session}`
pub async fn clear(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<CartView>> {
    let store = CartStore::new(state.pool());

    if let Err(e) = store.clear(&session).await {
        tracing::warn!(error = %e, "cart clear failed; continuing");
    }

    Ok(Json(CartView::from(Cart::new())))
}
