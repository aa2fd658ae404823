//! Durable cart snapshots.
//!
//! Each cart is stored whole as one JSONB snapshot keyed by an opaque
//! session token the client holds. Writes replace the snapshot; concurrent
//! writers are last-write-wins, which is acceptable for a cart.

use sqlx::PgPool;

use emberline_core::Cart;

use super::RepositoryError;

/// Store for cart snapshots.
pub struct CartStore<'a> {
    pool: &'a PgPool,
}

impl<'a> CartStore<'a> {
    /// Create a new cart store.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the cart for a session, or an empty cart if none is stored.
    ///
    /// A snapshot that no longer deserializes is treated as corrupt data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if the stored snapshot is unreadable.
    pub async fn load(&self, session_key: &str) -> Result<Cart, RepositoryError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT lines FROM carts WHERE session_key = $1")
                .bind(session_key)
                .fetch_optional(self.pool)
                .await?;

        match row {
            Some((value,)) => serde_json::from_value(value).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid cart snapshot: {e}"))
            }),
            None => Ok(Cart::new()),
        }
    }

    /// Persist the full cart snapshot for a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails, or
    /// `DataCorruption` if the cart cannot be serialized.
    pub async fn save(&self, session_key: &str, cart: &Cart) -> Result<(), RepositoryError> {
        let snapshot = serde_json::to_value(cart).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart snapshot serialization: {e}"))
        })?;

        sqlx::query(
            "INSERT INTO carts (session_key, lines, updated_at)
             VALUES ($1, $2, now())
             ON CONFLICT (session_key)
             DO UPDATE SET lines = EXCLUDED.lines, updated_at = now()",
        )
        .bind(session_key)
        .bind(snapshot)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Drop the stored cart for a session. A miss is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, session_key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM carts WHERE session_key = $1")
            .bind(session_key)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
