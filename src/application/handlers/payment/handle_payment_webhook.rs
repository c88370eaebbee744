//! HandlePaymentWebhookHandler - Command handler for payment provider webhooks.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::OrderId;
use crate::domain::order::OrderStatus;
use crate::domain::payment::{PaymentEventKind, ReconcileOutcome, WebhookError};
use crate::ports::{OrderRepository, PaymentGateway};

use super::reconcile_payment::{ReconcilePaymentCommand, ReconcilePaymentHandler};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, exactly as received.
    pub payload: Vec<u8>,
    /// Webhook signature header.
    pub signature: String,
}

/// Result of webhook processing. Every variant is acknowledged to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum HandlePaymentWebhookResult {
    /// A payment confirmation went through reconciliation.
    Reconciled { outcome: ReconcileOutcome },

    /// Checkout ended without payment.
    CheckoutAbandoned {
        order_id: OrderId,
        /// False if the order was no longer pending.
        canceled: bool,
    },

    /// Event acknowledged but no action taken.
    Ignored { event_type: String },
}

/// Handler for processing payment provider webhooks.
///
/// Only verified events reach the reconciler. Signature and payload
/// failures are client errors; storage failures are the only errors the
/// provider should retry.
pub struct HandlePaymentWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrderRepository>,
    reconciler: Arc<ReconcilePaymentHandler>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrderRepository>,
        reconciler: Arc<ReconcilePaymentHandler>,
    ) -> Self {
        Self {
            gateway,
            orders,
            reconciler,
        }
    }

    #[tracing::instrument(skip(self, cmd), fields(payload_len = cmd.payload.len()))]
    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Verify signature and parse
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await?;

        tracing::info!(event_id = %event.id, event_type = %event.event_type, "Webhook verified");

        // 2. Dispatch
        match event.kind {
            PaymentEventKind::CheckoutCompleted(confirmation) => {
                let outcome = self
                    .reconciler
                    .handle(ReconcilePaymentCommand { confirmation })
                    .await?;
                Ok(HandlePaymentWebhookResult::Reconciled { outcome })
            }
            PaymentEventKind::CheckoutAbandoned { order_id } => {
                let canceled = self
                    .orders
                    .transition_status(&order_id, OrderStatus::Pending, OrderStatus::Canceled)
                    .await?;
                if canceled {
                    tracing::info!(order_id = %order_id, "Order canceled after checkout was abandoned");
                } else {
                    tracing::info!(order_id = %order_id, "Abandoned checkout for an order that is not pending");
                }
                Ok(HandlePaymentWebhookResult::CheckoutAbandoned { order_id, canceled })
            }
            PaymentEventKind::Unhandled => {
                tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
                Ok(HandlePaymentWebhookResult::Ignored {
                    event_type: event.event_type,
                })
            }
        }
    }
}
