//! Business-logic services sitting between the routes and the repositories.

pub mod auth;
pub mod checkout;
pub mod email;
pub mod token;
