//! Checkout flow.
//!
//! Turns a cart snapshot plus a shipping form into a persisted order and a
//! merchant notification. The stages run strictly in this sequence:
//!
//! 1. empty-cart short-circuit (no database or SMTP work for an empty cart)
//! 2. shipping-form validation (missing fields are named in the error)
//! 3. totals: subtotal + the fixed shipping surcharge
//! 4. transactional persist of the order and its line snapshot
//! 5. best-effort merchant email (a failure never rolls back the order)
//! 6. best-effort clear of the stored cart - only after the persist
//!
//! Validation failures and transport failures are retryable by the client;
//! nothing here retries automatically.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use emberline_core::{CartLine, Email, EmailError as EmailParseError, UserId};

use crate::db::RepositoryError;
use crate::db::carts::CartStore;
use crate::db::orders::OrderRepository;
use crate::models::{NewOrder, Order, OrderLine};
use crate::services::email::EmailService;

/// Fixed shipping fee added to every order's subtotal.
pub const SHIPPING_SURCHARGE: i64 = 99;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The submitted cart has no lines; there is nothing to order.
    #[error("nothing to order: the cart is empty")]
    EmptyCart,

    /// Required shipping fields were empty.
    #[error("missing required fields: {0}")]
    MissingFields(String),

    /// The contact email does not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailParseError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A checkout submission: the shipping form plus the cart's line snapshot.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    /// The cart lines being ordered, as held by the client.
    #[serde(default)]
    pub items: Vec<CartLine>,
    /// Cart session token; when present, the stored cart is cleared after
    /// the order is safely persisted.
    #[serde(default)]
    pub cart_session: Option<String>,
}

impl CheckoutRequest {
    /// Validate the submission without touching any external resource.
    ///
    /// # Errors
    ///
    /// `EmptyCart` for a cart with no lines, `MissingFields` naming every
    /// empty required field, `InvalidEmail` for a malformed contact email.
    fn validate(&self) -> Result<Email, CheckoutError> {
        if self.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingFields(missing.join(", ")));
        }

        Ok(Email::parse(&self.email)?)
    }

    /// Order total: the snapshot's subtotal plus the shipping surcharge.
    ///
    /// Recomputed server-side; a client-supplied total is never trusted.
    #[must_use]
    fn total(&self) -> Decimal {
        let subtotal: Decimal = self.items.iter().map(CartLine::line_total).sum();
        subtotal + Decimal::from(SHIPPING_SURCHARGE)
    }
}

/// Generate an opaque order number, e.g. `EMB-04219774`.
#[must_use]
pub fn generate_order_number() -> String {
    format!("EMB-{:08}", rand::random::<u32>() % 100_000_000)
}

/// Checkout service.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
    carts: CartStore<'a>,
    email: &'a EmailService,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            carts: CartStore::new(pool),
            email,
        }
    }

    /// Submit an order.
    ///
    /// On success the order is durably persisted; the merchant email and the
    /// stored-cart clear are best-effort follow-ups.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` for validation failures (retryable by the
    /// client) or a repository failure during the persist.
    pub async fn submit(
        &self,
        request: CheckoutRequest,
        user_id: Option<UserId>,
    ) -> Result<Order, CheckoutError> {
        let email = request.validate()?;
        let total = request.total();

        let lines: Vec<OrderLine> = request
            .items
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id.clone(),
                product_name: line.name.clone(),
                variant: line.variant.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();

        let order = self
            .orders
            .create(&NewOrder {
                order_number: generate_order_number(),
                user_id,
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                email: email.into_inner(),
                phone: request.phone.clone(),
                address: request.address.clone(),
                city: request.city.clone(),
                state: request.state.clone(),
                postal_code: request.postal_code.clone(),
                total,
                lines,
            })
            .await?;

        // The order is durable from here on. Notification delivery is
        // at-least-once best-effort and must not undo the persist.
        if let Err(e) = self.email.send_order_notification(&order).await {
            tracing::warn!(
                error = %e,
                order_number = %order.order_number,
                "merchant order notification failed to send"
            );
        }

        // Clear the stored cart only now that the order is safe.
        if let Some(session) = &request.cart_session {
            if let Err(e) = self.carts.clear(session).await {
                tracing::warn!(error = %e, "failed to clear cart after checkout");
            }
        }

        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(product_id: &str, price: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: product_id.to_owned(),
            name: format!("Product {product_id}"),
            unit_price: Decimal::from(price),
            quantity,
            variant: None,
            custom_options: None,
        }
    }

    fn filled_request() -> CheckoutRequest {
        CheckoutRequest {
            first_name: "Mira".to_owned(),
            last_name: "Shah".to_owned(),
            email: "mira@example.com".to_owned(),
            phone: "555-0199".to_owned(),
            address: "12 Kiln Lane".to_owned(),
            city: "Pune".to_owned(),
            state: "MH".to_owned(),
            postal_code: Some("411001".to_owned()),
            items: vec![line("P1", 500, 1)],
            cart_session: None,
        }
    }

    #[test]
    fn test_empty_cart_short_circuits() {
        // Checked before the field validation, so an empty cart fails even
        // with a pristine form and before any I/O could happen.
        let request = CheckoutRequest {
            items: Vec::new(),
            ..filled_request()
        };
        assert!(matches!(
            request.validate(),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn test_missing_fields_are_named() {
        let request = CheckoutRequest {
            phone: String::new(),
            city: "  ".to_owned(),
            ..filled_request()
        };

        match request.validate() {
            Err(CheckoutError::MissingFields(fields)) => {
                assert_eq!(fields, "phone, city");
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_postal_code_is_not_required() {
        let request = CheckoutRequest {
            postal_code: None,
            ..filled_request()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let request = CheckoutRequest {
            email: "not-an-email".to_owned(),
            ..filled_request()
        };
        assert!(matches!(
            request.validate(),
            Err(CheckoutError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_total_adds_fixed_surcharge() {
        // Subtotal 500 + surcharge 99 = 599.
        let request = filled_request();
        assert_eq!(request.total(), Decimal::from(599));
    }

    #[test]
    fn test_total_sums_all_lines() {
        let request = CheckoutRequest {
            items: vec![line("P1", 100, 3), line("P2", 250, 2)],
            ..filled_request()
        };
        assert_eq!(request.total(), Decimal::from(300 + 500 + 99));
    }

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        assert!(number.starts_with("EMB-"));
        assert_eq!(number.len(), 4 + 8);
        assert!(number[4..].chars().all(|c| c.is_ascii_digit()));
    }
}
