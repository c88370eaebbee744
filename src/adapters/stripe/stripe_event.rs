//! Stripe webhook event types.
//!
//! Parses Stripe webhook payloads and maps the checkout events this
//! service acts on to provider-neutral [`PaymentEvent`]s. Only fields
//! relevant to reconciliation are captured.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{ExternalReference, Money, OrderId};
use crate::domain::payment::{PaymentConfirmation, PaymentEvent, PaymentEventKind, WebhookError};
use crate::ports::ORDER_ID_METADATA_KEY;

/// Stripe webhook event (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

/// The checkout session object carried by `checkout.session.*` events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    pub id: String,

    /// Payment intent id; the external payment reference.
    pub payment_intent: Option<String>,

    /// Total charged in minor units.
    pub amount_total: Option<i64>,

    /// "paid", "unpaid", or "no_payment_required".
    pub payment_status: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Known Stripe event types that we handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    /// Checkout finished; may still be awaiting an async payment.
    CheckoutSessionCompleted,
    /// Delayed payment method (bank debit, ...) succeeded.
    CheckoutSessionAsyncPaymentSucceeded,
    /// Delayed payment method failed.
    CheckoutSessionAsyncPaymentFailed,
    /// Session expired without payment.
    CheckoutSessionExpired,
    /// Unknown or unhandled event type.
    Unknown,
}

impl StripeEventType {
    /// Parse event type from string.
    pub fn parse(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.async_payment_succeeded" => {
                Self::CheckoutSessionAsyncPaymentSucceeded
            }
            "checkout.session.async_payment_failed" => Self::CheckoutSessionAsyncPaymentFailed,
            "checkout.session.expired" => Self::CheckoutSessionExpired,
            _ => Self::Unknown,
        }
    }
}

impl StripeEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }

    /// Deserializes the data object as a checkout session.
    pub fn checkout_session(&self) -> Result<StripeCheckoutSession, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("checkout session: {}", e)))
    }

    /// Maps this event onto a provider-neutral payment event.
    ///
    /// # Errors
    ///
    /// Returns `MissingMetadata`/`MissingField`/`ParseError` when a checkout
    /// event lacks what reconciliation needs.
    pub fn into_payment_event(self) -> Result<PaymentEvent, WebhookError> {
        let kind = match self.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => {
                let session = self.checkout_session()?;
                if session.payment_status.as_deref() == Some("unpaid") {
                    // Funds not captured yet; async_payment_succeeded follows.
                    PaymentEventKind::Unhandled
                } else {
                    PaymentEventKind::CheckoutCompleted(confirmation_from(&session)?)
                }
            }
            StripeEventType::CheckoutSessionAsyncPaymentSucceeded => {
                let session = self.checkout_session()?;
                PaymentEventKind::CheckoutCompleted(confirmation_from(&session)?)
            }
            StripeEventType::CheckoutSessionExpired
            | StripeEventType::CheckoutSessionAsyncPaymentFailed => {
                let session = self.checkout_session()?;
                PaymentEventKind::CheckoutAbandoned {
                    order_id: order_id_from(&session)?,
                }
            }
            StripeEventType::Unknown => PaymentEventKind::Unhandled,
        };

        Ok(PaymentEvent {
            id: self.id,
            event_type: self.event_type,
            kind,
        })
    }
}

fn order_id_from(session: &StripeCheckoutSession) -> Result<OrderId, WebhookError> {
    session
        .metadata
        .get(ORDER_ID_METADATA_KEY)
        .ok_or(WebhookError::MissingMetadata("order_id"))?
        .parse()
        .map_err(|_| WebhookError::ParseError("metadata.order_id is not a valid id".to_string()))
}

fn confirmation_from(session: &StripeCheckoutSession) -> Result<PaymentConfirmation, WebhookError> {
    let order_id = order_id_from(session)?;

    let reference = session
        .payment_intent
        .as_deref()
        .ok_or(WebhookError::MissingField("payment_intent"))?;
    let external_reference = ExternalReference::new(reference)
        .map_err(|e| WebhookError::ParseError(e.to_string()))?;

    let amount_total = session
        .amount_total
        .ok_or(WebhookError::MissingField("amount_total"))?;
    let amount =
        Money::from_cents(amount_total).map_err(|e| WebhookError::ParseError(e.to_string()))?;

    Ok(PaymentConfirmation {
        order_id,
        external_reference,
        amount,
    })
}

/// Builds a Stripe-shaped checkout event payload for tests and local tooling.
pub fn checkout_event_json(
    event_id: &str,
    event_type: &str,
    order_id: &OrderId,
    payment_intent: Option<&str>,
    amount_total: i64,
) -> serde_json::Value {
    serde_json::json!({
        "id": event_id,
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": {
            "object": {
                "id": format!("cs_{}", event_id),
                "object": "checkout.session",
                "payment_intent": payment_intent,
                "amount_total": amount_total,
                "payment_status": "paid",
                "metadata": { "order_id": order_id.to_string() }
            }
        }
    })
}
