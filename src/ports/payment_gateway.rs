//! Payment gateway port for the external payment provider.
//!
//! Defines the contract for checkout-session creation and webhook
//! verification. The provider's own API semantics stay behind this trait.
//!
//! # Design
//!
//! - **Gateway agnostic**: works with any provider offering hosted checkout
//! - **Verified input only**: `verify_webhook` is the only way a provider
//!   notification reaches the reconciler
//! - **No internal retry**: a failed session request surfaces immediately

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{DomainError, Money, OrderId};
use crate::domain::order::Order;
use crate::domain::payment::{PaymentEvent, WebhookError};

/// Metadata key carrying the order id through the provider.
pub const ORDER_ID_METADATA_KEY: &str = "order_id";

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a hosted checkout session for an order.
    ///
    /// Returns the session including the URL the customer is sent to.
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Verifies a webhook signature and parses the event.
    ///
    /// Returns the parsed event if valid, error if the signature or payload
    /// is invalid.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentEvent, WebhookError>;
}

/// One priced line shown on the provider's checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub name: String,
    pub amount: Money,
}

/// Request to create a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub order_id: OrderId,

    /// Order total in minor units.
    pub amount: Money,

    /// ISO-4217 currency code, lowercase.
    pub currency: String,

    pub lines: Vec<CheckoutLine>,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,

    /// Customer email for pre-fill.
    pub customer_email: Option<String>,

    /// Correlation metadata echoed back in webhooks. Always contains the order id.
    pub metadata: BTreeMap<String, String>,
}

impl CheckoutSessionRequest {
    /// Builds a request for an order, with the order id in metadata.
    pub fn for_order(
        order: &Order,
        currency: impl Into<String>,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
        customer_email: Option<String>,
    ) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(ORDER_ID_METADATA_KEY.to_string(), order.id.to_string());

        Self {
            order_id: order.id,
            amount: order.total,
            currency: currency.into(),
            lines: order
                .line_items
                .iter()
                .map(|line| CheckoutLine {
                    name: line.title.clone(),
                    amount: line.price_at_order,
                })
                .collect(),
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
            customer_email,
            metadata,
        }
    }
}

/// Hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// URL for the customer to complete checkout.
    pub url: String,

    /// When the session expires (Unix timestamp), if the provider says.
    pub expires_at: Option<i64>,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create an invalid request error (e.g. bad amount).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        use crate::domain::foundation::ErrorCode;
        DomainError::new(ErrorCode::PaymentGatewayError, err.message)
            .with_detail("gateway_code", err.code.to_string())
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Provider rejected the request (invalid amount, currency, ...).
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider API error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimitExceeded
                | PaymentErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
