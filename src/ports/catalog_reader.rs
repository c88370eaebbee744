//! Catalog reader port.
//!
//! Read-only price lookup. Catalog management is handled by another service.

use async_trait::async_trait;

use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::{DomainError, ItemId};

#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Finds a single catalog entry.
    async fn find_by_id(&self, item_id: &ItemId) -> Result<Option<CatalogItem>, DomainError>;

    /// Finds the entries that exist among `item_ids`. Missing ids are skipped.
    async fn find_by_ids(&self, item_ids: &[ItemId]) -> Result<Vec<CatalogItem>, DomainError>;
}
