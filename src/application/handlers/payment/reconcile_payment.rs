//! ReconcilePaymentHandler - Command handler that applies a payment confirmation to its order.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::order::Order;
use crate::domain::payment::{
    ApplyOutcome, PaymentConfirmation, ReconcileOutcome,
};
use crate::ports::{CartRepository, OrderRepository, PaymentRepository};

/// Command to reconcile one confirmed payment.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentCommand {
    pub confirmation: PaymentConfirmation,
}

/// Handler for payment reconciliation.
///
/// Safe to call any number of times with the same confirmation. The order
/// status change, payment row, and ownership grants are written as one unit
/// by the payment repository, keyed on the external reference; a replay or
/// a concurrent duplicate comes back as `AlreadyApplied`. Cart cleanup
/// happens afterwards and may fail without affecting the outcome.
pub struct ReconcilePaymentHandler {
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentRepository>,
    cart: Arc<dyn CartRepository>,
}

impl ReconcilePaymentHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payments: Arc<dyn PaymentRepository>,
        cart: Arc<dyn CartRepository>,
    ) -> Self {
        Self {
            orders,
            payments,
            cart,
        }
    }

    /// Applies the confirmation.
    ///
    /// # Errors
    ///
    /// Only storage failures. Every business outcome is a [`ReconcileOutcome`].
    #[tracing::instrument(
        skip(self, cmd),
        fields(
            order_id = %cmd.confirmation.order_id,
            external_reference = %cmd.confirmation.external_reference,
        )
    )]
    pub async fn handle(&self, cmd: ReconcilePaymentCommand) -> Result<ReconcileOutcome, DomainError> {
        let confirmation = cmd.confirmation;
        let order_id = confirmation.order_id;

        let Some(order) = self.orders.find_by_id(&order_id).await? else {
            tracing::warn!(order_id = %order_id, "Payment confirmation for unknown order");
            return Ok(ReconcileOutcome::from_apply(order_id, &ApplyOutcome::OrderNotFound));
        };

        if confirmation.amount != order.total {
            tracing::warn!(
                order_id = %order_id,
                expected = %order.total,
                received = %confirmation.amount,
                "Payment amount differs from order total; applying and flagging for review"
            );
        }

        let applied = self.payments.apply(&order, &confirmation).await?;
        let outcome = ReconcileOutcome::from_apply(order_id, &applied);

        match &applied {
            ApplyOutcome::Applied(payment) => {
                tracing::info!(
                    order_id = %order_id,
                    payment_id = %payment.id,
                    amount = %payment.amount,
                    granted_items = payment.items.len(),
                    "Payment applied"
                );
                self.remove_purchased_from_cart(&order).await;
            }
            ApplyOutcome::OrderAlreadyPaid | ApplyOutcome::DuplicateReference => {
                tracing::info!(order_id = %order_id, outcome = ?outcome, "Payment already applied");
            }
            ApplyOutcome::OrderNotPayable(status) => {
                tracing::warn!(
                    order_id = %order_id,
                    status = %status,
                    "Payment confirmed for an order that can no longer be paid; needs manual refund"
                );
            }
            ApplyOutcome::OrderNotFound => {
                tracing::warn!(order_id = %order_id, "Order disappeared during reconciliation");
            }
        }

        Ok(outcome)
    }

    async fn remove_purchased_from_cart(&self, order: &Order) {
        if let Err(e) = self
            .cart
            .remove_many(&order.user_id, &order.item_ids())
            .await
        {
            // Cart reads sweep owned items, so this converges on its own.
            tracing::warn!(order_id = %order.id, error = %e, "Failed to remove purchased items from cart");
        }
    }
}
