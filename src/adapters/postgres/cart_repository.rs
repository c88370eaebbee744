//! PostgreSQL implementation of CartRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::foundation::{DomainError, ItemId, Timestamp, UserId};
use crate::ports::{CartInsertResult, CartRepository};

use super::rows::{db_error, user_id};

pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    user_id: String,
    item_id: Uuid,
    added_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for CartItem {
    type Error = DomainError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        Ok(CartItem {
            user_id: user_id(row.user_id)?,
            item_id: ItemId::from_uuid(row.item_id),
            added_at: Timestamp::from_datetime(row.added_at),
        })
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn add(&self, item: &CartItem) -> Result<CartInsertResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, item_id, added_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, item_id) DO NOTHING
            "#,
        )
        .bind(item.user_id.as_str())
        .bind(item.item_id.as_uuid())
        .bind(item.added_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to add cart item", e))?;

        Ok(if result.rows_affected() == 0 {
            CartInsertResult::AlreadyPresent
        } else {
            CartInsertResult::Added
        })
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<CartItem>, DomainError> {
        let rows: Vec<CartRow> = sqlx::query_as(
            r#"
            SELECT user_id, item_id, added_at
            FROM cart_items
            WHERE user_id = $1
            ORDER BY added_at, item_id
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load cart", e))?;

        rows.into_iter().map(CartItem::try_from).collect()
    }

    async fn remove(&self, user_id: &UserId, item_id: &ItemId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND item_id = $2")
            .bind(user_id.as_str())
            .bind(item_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to remove cart item", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_many(&self, user_id: &UserId, item_ids: &[ItemId]) -> Result<u64, DomainError> {
        if item_ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = item_ids.iter().map(|id| *id.as_uuid()).collect();

        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND item_id = ANY($2)")
            .bind(user_id.as_str())
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to remove cart items", e))?;

        Ok(result.rows_affected())
    }

    async fn clear(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to clear cart", e))?;

        Ok(result.rows_affected())
    }
}
