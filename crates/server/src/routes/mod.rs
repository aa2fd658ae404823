//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                           - Liveness check
//! GET  /health/ready                     - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/register                - Create account, send verification email
//! POST /api/auth/login                   - Issue bearer token
//! GET  /api/auth/verify-email/{token}    - Redeem verification token (single use)
//! POST /api/auth/resend-verification     - Regenerate + resend verification email
//! GET  /api/auth/me                      - Current account (requires auth)
//!
//! # Catalog
//! GET    /api/products                   - Full catalog
//! GET    /api/products/{id}              - Product detail
//! POST   /api/products                   - Create product (admin)
//! PUT    /api/products/{id}              - Update product (admin)
//! DELETE /api/products/{id}              - Delete product (admin)
//!
//! # Cart (keyed by an opaque client-held session token)
//! GET    /api/cart/{session}             - Read cart
//! POST   /api/cart/{session}/items       - Add item (merges on product+variant)
//! PUT    /api/cart/{session}/items       - Set line quantity (0 removes)
//! DELETE /api/cart/{session}/items       - Remove line
//! DELETE /api/cart/{session}             - Clear cart
//!
//! # Orders
//! POST /api/orders/send-order-email      - Checkout: persist order + email merchant
//! GET  /api/orders/my                    - Own orders (requires auth)
//! GET    /api/orders                     - All orders (admin)
//! GET    /api/orders/{id}                - Order detail (admin)
//! PUT    /api/orders/{id}/status         - Status transition, forward-only (admin)
//! DELETE /api/orders/{id}                - Delete order (admin)
//!
//! # Users
//! GET    /api/users                      - All users (admin)
//! PUT    /api/users/{id}/role            - Change role (admin)
//! DELETE /api/users/{id}                 - Delete user (admin)
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify-email/{token}", get(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/me", get(auth::me))
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/{session}", get(cart::show).delete(cart::clear))
        .route(
            "/{session}/items",
            post(cart::add).put(cart::update).delete(cart::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/send-order-email", post(orders::checkout))
        .route("/my", get(orders::my_orders))
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show).delete(orders::delete))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the user admin routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}", delete(users::delete))
        .route("/{id}/role", put(users::update_role))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/users", user_routes())
}
