//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use emberline_core::{OrderId, OrderStatus, UserId};

/// A line item captured at order time.
///
/// This is a snapshot of what the customer bought - name, variant, and price
/// as they were at checkout - not a live reference into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    pub variant: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// A persisted order.
///
/// The line snapshot and total are immutable once created; only `status`
/// moves, and only forward.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Server-generated opaque order number, e.g. `EMB-00421977`.
    pub order_number: String,
    /// The account that placed the order, if the customer was signed in.
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    /// Subtotal plus the fixed shipping surcharge.
    pub total: Decimal,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to persist a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub total: Decimal,
    pub lines: Vec<OrderLine>,
}
