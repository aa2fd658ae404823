//! Signed bearer tokens.
//!
//! A token is `base64url(claims-json) . base64url(hmac-sha256)`, signed with
//! the server's token secret. It asserts user id, email, and role, and
//! expires after seven days. Verification checks the signature before
//! reading any claim, then the expiry.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use emberline_core::{Role, UserId};

use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime.
const TOKEN_TTL_DAYS: i64 = 7;

/// Errors from token verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not a `payload.signature` pair, or undecodable parts.
    #[error("malformed token")]
    Malformed,

    /// Signature does not match the payload.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token is past its expiry.
    #[error("token expired")]
    Expired,
}

/// The claims carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: UserId,
    /// User email at issue time.
    pub email: String,
    /// Role at issue time. Role changes take effect on the next login.
    pub role: Role,
    /// Expiry as a unix timestamp (seconds).
    pub exp: i64,
}

/// Issues and verifies signed bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: secret.expose_secret().as_bytes().to_vec(),
        }
    }

    /// Issue a token for a user, expiring in seven days.
    #[must_use]
    pub fn issue(&self, user: &User) -> String {
        let claims = Claims {
            sub: user.id,
            email: user.email.as_str().to_owned(),
            role: user.role,
            exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        self.sign(&claims)
    }

    /// Sign an explicit set of claims.
    #[must_use]
    pub fn sign(&self, claims: &Claims) -> String {
        // Claims serialization cannot fail: all fields are plain data.
        let json = serde_json::to_vec(claims).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes()));
        format!("{payload}.{signature}")
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` for anything that does not parse,
    /// `InvalidSignature` on a signature mismatch, and `Expired` once the
    /// expiry has passed.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(&SecretString::from("k".repeat(32)))
    }

    fn claims(exp: i64) -> Claims {
        Claims {
            sub: UserId::new(7),
            email: "user@example.com".to_owned(),
            role: Role::Customer,
            exp,
        }
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let signer = signer();
        let claims = claims(Utc::now().timestamp() + 3600);

        let token = signer.sign(&claims);
        let verified = signer.verify(&token).unwrap();
        assert_eq!(verified, claims);
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = signer();
        let token = signer.sign(&claims(Utc::now().timestamp() - 1));

        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = signer();
        let token = signer.sign(&claims(Utc::now().timestamp() + 3600));

        // Re-encode different claims over the original signature.
        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims(Utc::now().timestamp() + 999_999)).unwrap(),
        );
        let forged = format!("{forged_payload}.{signature}");

        assert_eq!(signer.verify(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = signer().sign(&claims(Utc::now().timestamp() + 3600));
        let other = TokenSigner::new(&SecretString::from("m".repeat(32)));

        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = signer();
        assert_eq!(signer.verify("no-dot-here"), Err(TokenError::Malformed));
        assert_eq!(signer.verify("a.!!!"), Err(TokenError::Malformed));
    }
}
