//! PostgreSQL implementation of OrderRepository.
//!
//! The single-pending-order rule is the partial unique index
//! `orders_one_pending_per_user`; a racing second insert fails on it and is
//! reported as `PendingExists`.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, OrderId, UserId};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{CreateOrderResult, OrderRepository};

use super::rows::{db_error, violates, LineItemRow, OrderRow};

const ONE_PENDING_PER_USER: &str = "orders_one_pending_per_user";

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn pending_order_id(&self, user_id: &UserId) -> Result<Option<Uuid>, DomainError> {
        sqlx::query_scalar("SELECT id FROM orders WHERE user_id = $1 AND status = 'pending'")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find pending order", e))
    }

    /// Loads line items for the given orders, grouped by order, in position order.
    async fn load_lines(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<LineItemRow>>, DomainError> {
        let rows: Vec<LineItemRow> = sqlx::query_as(
            r#"
            SELECT order_id, item_id, title, price_at_order_cents
            FROM order_line_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load order line items", e))?;

        let mut grouped: HashMap<Uuid, Vec<LineItemRow>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn hydrate(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.load_lines(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_lines = lines.remove(&row.id).unwrap_or_default();
                row.into_order(order_lines)
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create_pending(&self, order: &Order) -> Result<CreateOrderResult, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, total_cents, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_str())
        .bind(order.status.as_str())
        .bind(order.total.cents())
        .bind(order.created_at.as_datetime())
        .bind(order.updated_at.as_datetime())
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if violates(&e, ONE_PENDING_PER_USER) {
                tx.rollback()
                    .await
                    .map_err(|e| db_error("Failed to roll back order insert", e))?;
                return match self.pending_order_id(&order.user_id).await? {
                    Some(existing) => Ok(CreateOrderResult::PendingExists(OrderId::from_uuid(existing))),
                    // The other pending order resolved in between; surface the conflict.
                    None => Err(db_error("Pending order conflict", e)),
                };
            }
            return Err(db_error("Failed to insert order", e));
        }

        for (position, line) in order.line_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (order_id, position, item_id, title, price_at_order_cents)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(position as i32)
            .bind(line.item_id.as_uuid())
            .bind(&line.title)
            .bind(line.price_at_order.cents())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert order line item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit order", e))?;

        Ok(CreateOrderResult::Created)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, status, created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load order", e))?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn find_pending_for_user(&self, user_id: &UserId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, status, created_at, updated_at
            FROM orders
            WHERE user_id = $1 AND status = 'pending'
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find pending order", e))?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, status, created_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list orders", e))?;

        self.hydrate(rows).await
    }

    async fn transition_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $3, updated_at = now() WHERE id = $1 AND status = $2",
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update order status", e))?;

        Ok(result.rows_affected() == 1)
    }
}
