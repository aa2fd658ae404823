//! Domain types.
//!
//! These represent validated domain objects, separate from the raw database
//! row types that live with their repositories.

pub mod order;
pub mod product;
pub mod user;

pub use order::{NewOrder, Order, OrderLine};
pub use product::{Product, ProductInput};
pub use user::User;
