//! Order repository.
//!
//! Orders and their line snapshots are written together in one transaction;
//! after creation only the status column ever changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use emberline_core::{OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderLine};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: Option<i32>,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    address: String,
    city: String,
    state: String,
    postal_code: Option<String>,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: i32,
    product_id: String,
    product_name: String,
    variant: Option<String>,
    unit_price: Decimal,
    quantity: i32,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            user_id: self.user_id.map(UserId::new),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            total: self.total,
            status,
            lines,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrderLineRow {
    fn into_line(self) -> Result<OrderLine, RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "non-positive quantity {} in order line",
                self.quantity
            ))
        })?;

        Ok(OrderLine {
            product_id: self.product_id,
            product_name: self.product_name,
            variant: self.variant,
            unit_price: self.unit_price,
            quantity,
        })
    }
}

const ORDER_SELECT: &str = "SELECT id, order_number, user_id, first_name, last_name, email, \
     phone, address, city, state, postal_code, total, status, created_at, updated_at \
     FROM orders";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order together with its line snapshot, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// persisted in that case.
    pub async fn create(&self, new_order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders
                 (order_number, user_id, first_name, last_name, email, phone,
                  address, city, state, postal_code, total)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id, order_number, user_id, first_name, last_name, email,
                       phone, address, city, state, postal_code, total, status,
                       created_at, updated_at",
        )
        .bind(&new_order.order_number)
        .bind(new_order.user_id.as_ref().map(UserId::as_i32))
        .bind(&new_order.first_name)
        .bind(&new_order.last_name)
        .bind(&new_order.email)
        .bind(&new_order.phone)
        .bind(&new_order.address)
        .bind(&new_order.city)
        .bind(&new_order.state)
        .bind(&new_order.postal_code)
        .bind(new_order.total)
        .fetch_one(&mut *tx)
        .await?;

        for line in &new_order.lines {
            sqlx::query(
                "INSERT INTO order_lines
                     (order_id, product_id, product_name, variant, unit_price, quantity)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(row.id)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(&line.variant)
            .bind(line.unit_price)
            .bind(i32::try_from(line.quantity).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.into_order(new_order.lines.clone())
    }

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} ORDER BY created_at DESC"))
                .fetch_all(self.pool)
                .await?;

        self.attach_lines(rows).await
    }

    /// List the orders placed by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT} WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// Get a single order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };

        let lines = sqlx::query_as::<_, OrderLineRow>(
            "SELECT order_id, product_id, product_name, variant, unit_price, quantity
             FROM order_lines
             WHERE order_id = $1
             ORDER BY id",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderLineRow::into_line)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(row.into_order(lines)?))
    }

    /// Set an order's status.
    ///
    /// Transition validity is the caller's responsibility (see
    /// `OrderStatus::can_transition_to`); this is a plain column update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_i32())
            .bind(status.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an order (lines cascade).
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted, `false` if the order did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch the lines for a batch of orders and assemble domain objects.
    async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let line_rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT order_id, product_id, product_name, variant, unit_price, quantity
             FROM order_lines
             WHERE order_id = ANY($1)
             ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for line_row in line_rows {
            let order_id = line_row.order_id;
            by_order
                .entry(order_id)
                .or_default()
                .push(line_row.into_line()?);
        }

        rows.into_iter()
            .map(|row| {
                let lines = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect()
    }
}
