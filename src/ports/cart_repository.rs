//! Cart repository port.
//!
//! Cart rows are owned exclusively by the cart store. Implementations must
//! enforce uniqueness of `(user_id, item_id)` atomically.

use async_trait::async_trait;

use crate::domain::cart::CartItem;
use crate::domain::foundation::{DomainError, ItemId, UserId};

/// Result of inserting a cart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartInsertResult {
    /// Row inserted.
    Added,
    /// Row already existed; nothing changed.
    AlreadyPresent,
}

/// Repository port for cart rows.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Inserts a cart row if `(user_id, item_id)` is not present.
    async fn add(&self, item: &CartItem) -> Result<CartInsertResult, DomainError>;

    /// Lists a user's cart rows, oldest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<CartItem>, DomainError>;

    /// Removes one row. Returns false if it was not there.
    async fn remove(&self, user_id: &UserId, item_id: &ItemId) -> Result<bool, DomainError>;

    /// Removes the given items from a user's cart. Returns rows deleted.
    async fn remove_many(&self, user_id: &UserId, item_ids: &[ItemId]) -> Result<u64, DomainError>;

    /// Removes every row for a user. Returns rows deleted.
    async fn clear(&self, user_id: &UserId) -> Result<u64, DomainError>;
}
