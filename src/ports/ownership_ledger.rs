//! Ownership ledger port (read side).
//!
//! The ledger is the single source of truth for "does this user own this
//! item". Grants are written only by the payment store as part of
//! reconciliation, so this port exposes reads only.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::foundation::{DomainError, ItemId, UserId};
use crate::domain::payment::OwnershipRecord;

#[async_trait]
pub trait OwnershipLedger: Send + Sync {
    /// Returns true if the user owns the item.
    async fn owns(&self, user_id: &UserId, item_id: &ItemId) -> Result<bool, DomainError>;

    /// Returns the subset of `item_ids` the user owns.
    async fn owned_among(
        &self,
        user_id: &UserId,
        item_ids: &[ItemId],
    ) -> Result<HashSet<ItemId>, DomainError>;

    /// Lists every grant for a user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<OwnershipRecord>, DomainError>;
}
