//! Payment repository port.
//!
//! The only writer of payments and ownership grants.
//!
//! # Applying a confirmation
//!
//! `apply` performs, as one atomic unit:
//!
//! 1. order `pending → paid` (conditional on the order still being pending)
//! 2. insert the payment; a conflict on `external_reference` aborts the unit
//!    and reports `DuplicateReference`
//! 3. insert an ownership grant per line item, skipping grants that exist
//!
//! Replaying the same confirmation is always safe: the first guard that
//! trips is reported and nothing is written.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ExternalReference, OrderId, UserId};
use crate::domain::order::Order;
use crate::domain::payment::{ApplyOutcome, Payment, PaymentConfirmation};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Applies a payment confirmation to an order.
    ///
    /// `order` supplies the line items to grant; its stored status is
    /// re-checked inside the unit.
    async fn apply(
        &self,
        order: &Order,
        confirmation: &PaymentConfirmation,
    ) -> Result<ApplyOutcome, DomainError>;

    /// Finds a payment by its provider reference.
    async fn find_by_external_reference(
        &self,
        reference: &ExternalReference,
    ) -> Result<Option<Payment>, DomainError>;

    /// Finds the payment for an order.
    async fn find_by_order(&self, order_id: &OrderId) -> Result<Option<Payment>, DomainError>;

    /// Lists a user's payments, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Payment>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRepository) {}
    }
}
