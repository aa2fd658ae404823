//! Shopping cart state machine.
//!
//! The cart is an insertion-ordered collection of line items. Two lines merge
//! only when their full identity key - `(product_id, variant)` - matches;
//! the same product in two variants stays as two lines. Totals are always
//! derived from the current lines, never stored, so they cannot drift.
//!
//! The cart itself performs no I/O. Callers load a snapshot, apply one or
//! more operations, and persist the result; see the server's cart store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cart line.
///
/// `unit_price` is captured when the line is added; the cart does not chase
/// later catalog price changes (checkout snapshots lines anyway).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog identity of the product.
    pub product_id: String,
    /// Display name, carried for rendering and order snapshots.
    pub name: String,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Always `>= 1`; a line that would reach zero is removed instead.
    pub quantity: u32,
    /// Optional variant (e.g. a size). Part of the line's identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Opaque per-line options (e.g. a custom engraving). Not part of the
    /// identity key; carried through to the order snapshot untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_options: Option<serde_json::Value>,
}

impl CartLine {
    /// Line total: `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    fn matches(&self, product_id: &str, variant: Option<&str>) -> bool {
        self.product_id == product_id && self.variant.as_deref() == variant
    }
}

/// Input for [`Cart::add_item`].
///
/// Quantity is optional and defaults to 1, matching the storefront's
/// "add to cart" button which adds a single unit unless told otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineInput {
    pub product_id: String,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub custom_options: Option<serde_json::Value>,
}

/// The cart aggregate.
///
/// Operations apply synchronously and in full before the next is accepted;
/// there is no partial state to observe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// True when the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of `unit_price * quantity` across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Add an item to the cart.
    ///
    /// If a line with the same `(product_id, variant)` already exists, its
    /// quantity is incremented by the input quantity (default 1); otherwise a
    /// new line is appended at the end.
    pub fn add_item(&mut self, input: CartLineInput) {
        let quantity = input.quantity.unwrap_or(1).max(1);

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.matches(&input.product_id, input.variant.as_deref()))
        {
            line.quantity += quantity;
            return;
        }

        self.lines.push(CartLine {
            product_id: input.product_id,
            name: input.name,
            unit_price: input.unit_price,
            quantity,
            variant: input.variant,
            custom_options: input.custom_options,
        });
    }

    /// Remove every line matching `(product_id, variant)`.
    ///
    /// A miss is a no-op, not an error.
    pub fn remove_item(&mut self, product_id: &str, variant: Option<&str>) {
        self.lines
            .retain(|line| !line.matches(product_id, variant));
    }

    /// Set the quantity of the line matching `(product_id, variant)`.
    ///
    /// A quantity of zero removes the line; a non-positive quantity is never
    /// stored.
    pub fn set_quantity(&mut self, product_id: &str, variant: Option<&str>, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id, variant);
            return;
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.matches(product_id, variant))
        {
            line.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(product_id: &str, price: i64, quantity: Option<u32>, variant: Option<&str>) -> CartLineInput {
        CartLineInput {
            product_id: product_id.to_owned(),
            name: format!("Product {product_id}"),
            unit_price: Decimal::from(price),
            quantity,
            variant: variant.map(str::to_owned),
            custom_options: None,
        }
    }

    #[test]
    fn test_add_merges_on_identity_key() {
        let mut cart = Cart::new();
        cart.add_item(input("P1", 100, Some(1), None));
        cart.add_item(input("P1", 100, Some(2), None));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.subtotal(), Decimal::from(300));
    }

    #[test]
    fn test_add_defaults_quantity_to_one() {
        let mut cart = Cart::new();
        cart.add_item(input("P1", 50, None, None));
        cart.add_item(input("P1", 50, None, None));

        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_item_count_sums_repeated_adds() {
        let mut cart = Cart::new();
        for quantity in [1, 4, 2] {
            cart.add_item(input("P1", 10, Some(quantity), None));
        }

        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_variants_never_merge() {
        let mut cart = Cart::new();
        cart.add_item(input("P1", 100, Some(1), Some("S")));
        cart.add_item(input("P1", 100, Some(1), Some("M")));
        cart.add_item(input("P1", 100, Some(1), None));

        assert_eq!(cart.lines().len(), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_then_remove_leaves_empty_cart() {
        let mut cart = Cart::new();
        cart.add_item(input("P1", 100, Some(2), Some("L")));
        cart.remove_item("P1", Some("L"));

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_remove_miss_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(input("P1", 100, Some(1), None));
        cart.remove_item("P2", None);
        // Variant mismatch is a miss too.
        cart.remove_item("P1", Some("S"));

        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        cart.add_item(input("P1", 100, Some(1), None));
        cart.set_quantity("P1", None, 5);

        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.subtotal(), Decimal::from(500));
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let mut removed = Cart::new();
        removed.add_item(input("P1", 100, Some(3), None));
        removed.remove_item("P1", None);

        let mut zeroed = Cart::new();
        zeroed.add_item(input("P1", 100, Some(3), None));
        zeroed.set_quantity("P1", None, 0);

        assert_eq!(removed, zeroed);
        assert!(zeroed.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(input("P1", 100, Some(1), None));
        cart.add_item(input("P2", 200, Some(2), None));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_recomputed_after_every_mutation() {
        let mut cart = Cart::new();

        cart.add_item(input("P1", 100, Some(1), None));
        assert_eq!(cart.subtotal(), Decimal::from(100));

        cart.add_item(input("P2", 250, Some(2), None));
        assert_eq!(cart.subtotal(), Decimal::from(600));

        cart.set_quantity("P2", None, 1);
        assert_eq!(cart.subtotal(), Decimal::from(350));

        cart.remove_item("P1", None);
        assert_eq!(cart.subtotal(), Decimal::from(250));

        cart.clear();
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_insertion_order_is_stable() {
        let mut cart = Cart::new();
        cart.add_item(input("P3", 1, Some(1), None));
        cart.add_item(input("P1", 1, Some(1), None));
        cart.add_item(input("P2", 1, Some(1), None));
        // Merging into an existing line must not reorder it.
        cart.add_item(input("P1", 1, Some(1), None));

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, ["P3", "P1", "P2"]);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut cart = Cart::new();
        cart.add_item(CartLineInput {
            custom_options: Some(serde_json::json!({"engraving": "for Mira"})),
            ..input("P1", 499, Some(2), Some("M"))
        });

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.item_count(), 2);
    }
}
