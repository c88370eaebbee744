//! Order repository port.
//!
//! # Design
//!
//! - **Single pending order**: `create_pending` must atomically refuse a
//!   second pending order for the same user (unique index or lock), never
//!   check-then-insert
//! - **Compare-and-set status**: status writes name the expected current
//!   status so a cancel cannot overwrite a concurrent payment
//! - **No deletes**: orders are only ever transitioned

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, UserId};
use crate::domain::order::{Order, OrderStatus};

/// Result of creating a pending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOrderResult {
    /// Order and line items persisted.
    Created,
    /// The user already has this pending order; nothing was written.
    PendingExists(OrderId),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a new pending order with its line items as one unit.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create_pending(&self, order: &Order) -> Result<CreateOrderResult, DomainError>;

    /// Finds an order with its line items.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Finds the user's pending order, if any.
    async fn find_pending_for_user(&self, user_id: &UserId) -> Result<Option<Order>, DomainError>;

    /// Lists the user's orders, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError>;

    /// Moves an order from `from` to `to` only if it is currently `from`.
    ///
    /// Returns false if the order was not in `from` (or does not exist).
    async fn transition_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, DomainError>;
}
