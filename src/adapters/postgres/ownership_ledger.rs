//! PostgreSQL implementation of OwnershipLedger (read side).
//!
//! Grants are written only inside the reconciliation transaction in
//! `PostgresPaymentRepository::apply`.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ItemId, UserId};
use crate::domain::payment::OwnershipRecord;
use crate::ports::OwnershipLedger;

use super::rows::{db_error, OwnershipRow};

pub struct PostgresOwnershipLedger {
    pool: PgPool,
}

impl PostgresOwnershipLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnershipLedger for PostgresOwnershipLedger {
    async fn owns(&self, user_id: &UserId, item_id: &ItemId) -> Result<bool, DomainError> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM ownership_records WHERE user_id = $1 AND item_id = $2)",
        )
        .bind(user_id.as_str())
        .bind(item_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check ownership", e))?;

        Ok(owned)
    }

    async fn owned_among(
        &self,
        user_id: &UserId,
        item_ids: &[ItemId],
    ) -> Result<HashSet<ItemId>, DomainError> {
        if item_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = item_ids.iter().map(|id| *id.as_uuid()).collect();

        let owned: Vec<Uuid> = sqlx::query_scalar(
            "SELECT item_id FROM ownership_records WHERE user_id = $1 AND item_id = ANY($2)",
        )
        .bind(user_id.as_str())
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check ownership", e))?;

        Ok(owned.into_iter().map(ItemId::from_uuid).collect())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<OwnershipRecord>, DomainError> {
        let rows: Vec<OwnershipRow> = sqlx::query_as(
            r#"
            SELECT user_id, item_id, order_id, granted_at
            FROM ownership_records
            WHERE user_id = $1
            ORDER BY granted_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list owned items", e))?;

        rows.into_iter().map(OwnershipRecord::try_from).collect()
    }
}
