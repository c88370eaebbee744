//! Mock payment gateway for testing.
//!
//! Provides a configurable implementation of `PaymentGateway` for unit and
//! integration tests. Supports:
//! - Error injection for checkout-session creation
//! - Call tracking
//! - Webhook verification that accepts anything, checks real signatures, or always fails

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::payment::{PaymentEvent, WebhookError};
use crate::ports::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway};

use super::stripe_event::StripeEvent;
use super::webhook_verifier::StripeWebhookVerifier;

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.fail_checkout(PaymentError::network("connection refused"));
///
/// let result = gateway.create_checkout_session(request).await;
/// assert!(result.is_err());
/// ```
#[derive(Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Error returned by every `create_checkout_session` call while set.
    checkout_error: Option<PaymentError>,

    /// Requests received, in order.
    checkout_requests: Vec<CheckoutSessionRequest>,

    /// Number of `verify_webhook` calls.
    verify_calls: usize,

    webhook_verify_mode: WebhookVerifyMode,
}

/// How to handle webhook verification.
#[derive(Default)]
enum WebhookVerifyMode {
    /// Ignore the signature and parse the payload as a Stripe event.
    #[default]
    AcceptAll,

    /// Verify the signature exactly as Stripe would, with this secret.
    RequireSignature(StripeWebhookVerifier),

    /// Always fail verification.
    AlwaysFail,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    /// Create a mock that verifies webhook signatures against `secret`.
    pub fn with_webhook_secret(secret: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::RequireSignature(
            StripeWebhookVerifier::new(SecretString::new(secret.into())),
        );
        mock
    }

    /// Create a mock whose checkout-session calls fail with a network error.
    pub fn failing_checkout() -> Self {
        let mock = Self::new();
        mock.fail_checkout(PaymentError::network("payment provider unavailable"));
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Makes every checkout-session call fail with `error` until restored.
    pub fn fail_checkout(&self, error: PaymentError) {
        self.state().checkout_error = Some(error);
    }

    /// Restores successful checkout-session creation.
    pub fn restore_checkout(&self) {
        self.state().checkout_error = None;
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Checkout-session requests received so far.
    pub fn checkout_requests(&self) -> Vec<CheckoutSessionRequest> {
        self.state().checkout_requests.clone()
    }

    pub fn checkout_call_count(&self) -> usize {
        self.state().checkout_requests.len()
    }

    pub fn verify_call_count(&self) -> usize {
        self.state().verify_calls
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.state();
        let session_number = state.checkout_requests.len() + 1;
        let order_id = request.order_id;
        state.checkout_requests.push(request);

        if let Some(error) = &state.checkout_error {
            return Err(error.clone());
        }

        let id = format!("cs_mock_{}", session_number);
        Ok(CheckoutSession {
            url: format!("https://checkout.mock/pay/{}?order={}", id, order_id),
            id,
            expires_at: Some(chrono::Utc::now().timestamp() + 24 * 60 * 60),
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentEvent, WebhookError> {
        let mut state = self.state();
        state.verify_calls += 1;

        let event = match &state.webhook_verify_mode {
            WebhookVerifyMode::AcceptAll => serde_json::from_slice::<StripeEvent>(payload)
                .map_err(|e| WebhookError::ParseError(e.to_string()))?,
            WebhookVerifyMode::RequireSignature(verifier) => {
                verifier.verify_and_parse(payload, signature)?
            }
            WebhookVerifyMode::AlwaysFail => return Err(WebhookError::InvalidSignature),
        };

        event.into_payment_event()
    }
}
