//! Payment domain - payments, ownership grants, and reconciliation.
//!
//! A verified provider notification becomes a [`PaymentConfirmation`],
//! which is applied to its order exactly once. The external payment
//! reference is the idempotency key.

mod event;
mod payment;
mod reconciliation;
mod webhook_errors;

pub use event::{PaymentEvent, PaymentEventKind};
pub use payment::{OwnershipRecord, Payment, PaymentItem, PaymentStatus};
pub use reconciliation::{
    AlreadyAppliedReason, ApplyOutcome, PaymentConfirmation, ReconcileOutcome, RejectionReason,
};
pub use webhook_errors::WebhookError;
