//! Reconciliation inputs and outcomes.
//!
//! Replays and duplicates are normal when a payment provider delivers
//! webhooks, so every outcome here is a value, not an error.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ExternalReference, Money, OrderId, PaymentId};
use crate::domain::order::OrderStatus;

use super::Payment;

/// A verified "payment succeeded" signal for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: OrderId,
    pub external_reference: ExternalReference,
    pub amount: Money,
}

/// What the payment store did when asked to apply a confirmation.
///
/// The store runs the status change, payment insert, and ownership grants
/// as one unit and reports which guard stopped it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Order moved to paid, payment recorded, ownership granted.
    Applied(Payment),

    /// The order was already paid when the unit started.
    OrderAlreadyPaid,

    /// A payment with this external reference already exists.
    DuplicateReference,

    /// The order is in a status that cannot become paid.
    OrderNotPayable(OrderStatus),

    /// No such order.
    OrderNotFound,
}

/// Why a confirmation was treated as already handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlreadyAppliedReason {
    OrderAlreadyPaid,
    DuplicateReference,
}

/// Why a confirmation was acknowledged without being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    OrderNotFound,
    OrderCanceled,
}

/// Result of reconciling one payment confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Applied {
        order_id: OrderId,
        payment_id: PaymentId,
        granted_items: usize,
    },
    AlreadyApplied {
        order_id: OrderId,
        reason: AlreadyAppliedReason,
    },
    Rejected {
        order_id: OrderId,
        reason: RejectionReason,
    },
}

impl ReconcileOutcome {
    /// Maps a store outcome onto the reconciliation result.
    pub fn from_apply(order_id: OrderId, outcome: &ApplyOutcome) -> Self {
        match outcome {
            ApplyOutcome::Applied(payment) => ReconcileOutcome::Applied {
                order_id,
                payment_id: payment.id,
                granted_items: payment.items.len(),
            },
            ApplyOutcome::OrderAlreadyPaid => ReconcileOutcome::AlreadyApplied {
                order_id,
                reason: AlreadyAppliedReason::OrderAlreadyPaid,
            },
            ApplyOutcome::DuplicateReference => ReconcileOutcome::AlreadyApplied {
                order_id,
                reason: AlreadyAppliedReason::DuplicateReference,
            },
            ApplyOutcome::OrderNotPayable(_) => ReconcileOutcome::Rejected {
                order_id,
                reason: RejectionReason::OrderCanceled,
            },
            ApplyOutcome::OrderNotFound => ReconcileOutcome::Rejected {
                order_id,
                reason: RejectionReason::OrderNotFound,
            },
        }
    }

    pub fn order_id(&self) -> OrderId {
        match self {
            ReconcileOutcome::Applied { order_id, .. }
            | ReconcileOutcome::AlreadyApplied { order_id, .. }
            | ReconcileOutcome::Rejected { order_id, .. } => *order_id,
        }
    }

    /// True unless the confirmation was rejected, meaning no redelivery is
    /// needed. A duplicate reference may belong to another order, so this
    /// does not prove that `order_id` is paid.
    pub fn is_settled(&self) -> bool {
        !matches!(self, ReconcileOutcome::Rejected { .. })
    }
}
