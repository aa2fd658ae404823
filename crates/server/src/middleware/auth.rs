//! Authentication extractors.
//!
//! Protected handlers take [`RequireAuth`] (any signed-in user) or
//! [`RequireAdmin`] (admin role); handlers that merely personalise take
//! [`OptionalAuth`]. All three read the `Authorization: Bearer` header and
//! verify the token against the application's signer.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn my_orders(
//!     RequireAuth(claims): RequireAuth,
//! ) -> impl IntoResponse {
//!     format!("orders for user {}", claims.sub)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::error::AppError;
use crate::services::token::Claims;
use crate::state::AppState;

/// Extract the bearer token from the `Authorization` header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verify the request's bearer token and return its claims.
fn authenticate(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let token = bearer_token(&parts.headers)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

    state
        .tokens()
        .verify(token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))
}

/// Extractor that requires a valid bearer token.
pub struct RequireAuth(pub Claims);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

/// Extractor that requires a valid bearer token with the admin role.
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state)?;

        if !claims.role.is_admin() {
            return Err(AppError::Forbidden(
                "admin privileges required".to_string(),
            ));
        }

        Ok(Self(claims))
    }
}

/// Extractor that accepts but does not require authentication.
///
/// An invalid or expired token is treated the same as no token: the
/// request proceeds anonymously.
pub struct OptionalAuth(pub Option<Claims>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).ok()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        let headers = headers_with("Bearer abc.def");
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_wrong_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&headers), None);
    }
}
