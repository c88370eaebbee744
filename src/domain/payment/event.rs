//! Verified payment-provider events, in provider-neutral form.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::OrderId;

use super::PaymentConfirmation;

/// An authenticated notification from the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Provider event id, for logging only. Idempotency uses the payment reference.
    pub id: String,

    /// Provider event type string.
    pub event_type: String,

    pub kind: PaymentEventKind,
}

/// What the event means for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentEventKind {
    /// Checkout completed and the customer paid.
    CheckoutCompleted(PaymentConfirmation),

    /// Checkout session ended without payment (expired or async payment failed).
    CheckoutAbandoned { order_id: OrderId },

    /// Event type this service does not act on.
    Unhandled,
}

impl PaymentEvent {
    pub fn order_id(&self) -> Option<OrderId> {
        match &self.kind {
            PaymentEventKind::CheckoutCompleted(confirmation) => Some(confirmation.order_id),
            PaymentEventKind::CheckoutAbandoned { order_id } => Some(*order_id),
            PaymentEventKind::Unhandled => None,
        }
    }
}
