//! PostgreSQL implementation of CatalogReader.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::{DomainError, ItemId};
use crate::ports::CatalogReader;

use super::rows::{db_error, money};

pub struct PostgresCatalogReader {
    pool: PgPool,
}

impl PostgresCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: Uuid,
    title: String,
    price_cents: i64,
}

impl TryFrom<CatalogRow> for CatalogItem {
    type Error = DomainError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        Ok(CatalogItem::new(
            ItemId::from_uuid(row.id),
            row.title,
            money("price_cents", row.price_cents)?,
        ))
    }
}

#[async_trait]
impl CatalogReader for PostgresCatalogReader {
    async fn find_by_id(&self, item_id: &ItemId) -> Result<Option<CatalogItem>, DomainError> {
        let row: Option<CatalogRow> = sqlx::query_as(
            "SELECT id, title, price_cents FROM catalog_items WHERE id = $1",
        )
        .bind(item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load catalog item", e))?;

        row.map(CatalogItem::try_from).transpose()
    }

    async fn find_by_ids(&self, item_ids: &[ItemId]) -> Result<Vec<CatalogItem>, DomainError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = item_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<CatalogRow> = sqlx::query_as(
            "SELECT id, title, price_cents FROM catalog_items WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load catalog items", e))?;

        rows.into_iter().map(CatalogItem::try_from).collect()
    }
}
