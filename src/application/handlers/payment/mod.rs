//! Payment handlers.
//!
//! ## Commands
//! - Reconciling a confirmed payment into a paid order and ownership grants
//! - Processing verified payment provider webhooks
//!
//! ## Queries
//! - List a user's payments
//! - List a user's owned items

mod handle_payment_webhook;
mod list_owned_items;
mod list_payments;
mod reconcile_payment;

// Commands
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use reconcile_payment::{ReconcilePaymentCommand, ReconcilePaymentHandler};

// Queries
pub use list_owned_items::{ListOwnedItemsHandler, ListOwnedItemsQuery};
pub use list_payments::{ListPaymentsHandler, ListPaymentsQuery};
