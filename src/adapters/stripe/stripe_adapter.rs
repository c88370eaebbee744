//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against Stripe Checkout: one-off
//! `mode=payment` sessions with inline price data, and webhook verification
//! for the `checkout.session.*` events.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay protection
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret).with_require_livemode(true);
//! let gateway = StripePaymentGateway::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::payment::{PaymentEvent, WebhookError};
use crate::ports::{
    CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentErrorCode, PaymentGateway,
};

use super::webhook_verifier::StripeWebhookVerifier;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Reject test-mode events when running live.
    require_livemode: bool,

    /// Per-request timeout for API calls.
    request_timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString, webhook_secret: SecretString) -> Self {
        Self {
            api_key,
            webhook_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Stripe Checkout gateway.
pub struct StripePaymentGateway {
    config: StripeConfig,
    verifier: StripeWebhookVerifier,
    http_client: reqwest::Client,
}

impl StripePaymentGateway {
    /// Builds the gateway and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the HTTP client cannot be constructed.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::network(e.to_string()))?;
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.clone());

        Ok(Self {
            config,
            verifier,
            http_client,
        })
    }
}

/// Stripe's checkout session response (fields we use).
#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: Option<String>,
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Form parameters for `POST /v1/checkout/sessions`.
fn checkout_form_params(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("client_reference_id".to_string(), request.order_id.to_string()),
    ];

    for (i, line) in request.lines.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        params.push((
            format!("{}[price_data][currency]", prefix),
            request.currency.clone(),
        ));
        params.push((
            format!("{}[price_data][unit_amount]", prefix),
            line.amount.cents().to_string(),
        ));
        params.push((
            format!("{}[price_data][product_data][name]", prefix),
            line.name.clone(),
        ));
        params.push((format!("{}[quantity]", prefix), "1".to_string()));
    }

    for (key, value) in &request.metadata {
        params.push((format!("metadata[{}]", key), value.clone()));
        // Copied onto the payment intent so it is visible in the dashboard.
        params.push((
            format!("payment_intent_data[metadata][{}]", key),
            value.clone(),
        ));
    }

    if let Some(email) = &request.customer_email {
        params.push(("customer_email".to_string(), email.clone()));
    }

    params
}

/// Maps a non-success Stripe response to a gateway error.
fn error_from_response(status: StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorResponse>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|r| r.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error ({})", status));

    let code = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PaymentErrorCode::AuthenticationError,
        StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
        s if s.is_client_error() => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let error = PaymentError::new(code, message);
    match parsed.and_then(|r| r.error.code) {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id, amount = %request.amount))]
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        if request.lines.is_empty() {
            return Err(PaymentError::invalid_request("checkout session has no line items"));
        }

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = checkout_form_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = error_from_response(status, &body);
            tracing::warn!(
                status = %status,
                code = %error.code,
                provider_code = ?error.provider_code,
                "Stripe rejected checkout session request"
            );
            return Err(error);
        }

        let session: StripeSessionResponse = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        let url = session.url.ok_or_else(|| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                "Stripe session response has no url",
            )
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
            expires_at: session.expires_at,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentEvent, WebhookError> {
        let event = self
            .verifier
            .verify_and_parse(payload, signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "Stripe webhook verification failed");
                e
            })?;

        if self.config.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Test-mode webhook received in live mode");
            return Err(WebhookError::LivemodeMismatch);
        }

        event.into_payment_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::{checkout_event_json, signature_header};
    use crate::domain::foundation::{Money, OrderId};
    use crate::domain::payment::PaymentEventKind;
    use crate::ports::CheckoutLine;
    use std::collections::BTreeMap;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn gateway(require_livemode: bool) -> StripePaymentGateway {
        let config = StripeConfig::new(
            SecretString::new("sk_test_123".to_string()),
            SecretString::new(WEBHOOK_SECRET.to_string()),
        )
        .with_require_livemode(require_livemode);
        StripePaymentGateway::new(config).unwrap()
    }

    fn request() -> CheckoutSessionRequest {
        let order_id = OrderId::new();
        let mut metadata = BTreeMap::new();
        metadata.insert("order_id".to_string(), order_id.to_string());
        CheckoutSessionRequest {
            order_id,
            amount: Money::from_cents(1500).unwrap(),
            currency: "usd".to_string(),
            lines: vec![
                CheckoutLine {
                    name: "Alien".to_string(),
                    amount: Money::from_cents(1000).unwrap(),
                },
                CheckoutLine {
                    name: "Heat".to_string(),
                    amount: Money::from_cents(500).unwrap(),
                },
            ],
            success_url: "https://shop.test/ok".to_string(),
            cancel_url: "https://shop.test/cancel".to_string(),
            customer_email: None,
            metadata,
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // ══════════════════════════════════════════════════════════════
    // Request Encoding
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn form_params_use_one_time_payment_mode_with_inline_prices() {
        let request = request();
        let params = checkout_form_params(&request);

        assert_eq!(param(&params, "mode"), Some("payment"));
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), Some("1000"));
        assert_eq!(param(&params, "line_items[1][price_data][product_data][name]"), Some("Heat"));
        assert_eq!(param(&params, "line_items[1][quantity]"), Some("1"));
        assert_eq!(param(&params, "line_items[0][price_data][currency]"), Some("usd"));
    }

    #[test]
    fn form_params_carry_order_id_for_correlation() {
        let request = request();
        let params = checkout_form_params(&request);
        let order_id = request.order_id.to_string();

        assert_eq!(param(&params, "metadata[order_id]"), Some(order_id.as_str()));
        assert_eq!(param(&params, "client_reference_id"), Some(order_id.as_str()));
    }

    #[test]
    fn customer_email_is_only_sent_when_known() {
        let mut request = request();
        assert_eq!(param(&checkout_form_params(&request), "customer_email"), None);

        request.customer_email = Some("a@b.test".to_string());
        assert_eq!(
            param(&checkout_form_params(&request), "customer_email"),
            Some("a@b.test")
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Error Mapping
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn unauthorized_maps_to_authentication_error() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.code, PaymentErrorCode::AuthenticationError);
    }

    #[test]
    fn stripe_error_body_supplies_message_and_code() {
        let body = r#"{"error":{"message":"Invalid currency","code":"parameter_invalid","type":"invalid_request_error"}}"#;
        let err = error_from_response(StatusCode::BAD_REQUEST, body);

        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(err.message, "Invalid currency");
        assert_eq!(err.provider_code.as_deref(), Some("parameter_invalid"));
    }

    #[test]
    fn server_errors_are_retryable_provider_errors() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(err.code, PaymentErrorCode::ProviderError);
        assert!(err.is_retryable());
    }

    #[test]
    fn rate_limit_is_detected() {
        let err = error_from_response(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err.code, PaymentErrorCode::RateLimitExceeded);
    }

    #[tokio::test]
    async fn empty_request_is_rejected_before_any_network_call() {
        let mut request = request();
        request.lines.clear();

        let err = gateway(false).create_checkout_session(request).await.unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
    }

    // ══════════════════════════════════════════════════════════════
    // Webhook Verification
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn verify_webhook_returns_domain_event() {
        let order_id = OrderId::new();
        let body = checkout_event_json("evt_1", "checkout.session.completed", &order_id, Some("pay_1"), 1500)
            .to_string();
        let header = signature_header(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), body.as_bytes());

        let event = gateway(false).verify_webhook(body.as_bytes(), &header).await.unwrap();

        assert_eq!(event.order_id(), Some(order_id));
        assert!(matches!(event.kind, PaymentEventKind::CheckoutCompleted(_)));
    }

    #[tokio::test]
    async fn verify_webhook_rejects_bad_signature() {
        let body = checkout_event_json("evt_1", "checkout.session.completed", &OrderId::new(), Some("pay_1"), 1500)
            .to_string();
        let header = signature_header("whsec_wrong", chrono::Utc::now().timestamp(), body.as_bytes());

        let result = gateway(false).verify_webhook(body.as_bytes(), &header).await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_mode_event_rejected_when_livemode_required() {
        let body = checkout_event_json("evt_1", "checkout.session.completed", &OrderId::new(), Some("pay_1"), 1500)
            .to_string();
        let header = signature_header(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), body.as_bytes());

        let result = gateway(true).verify_webhook(body.as_bytes(), &header).await;

        assert!(matches!(result, Err(WebhookError::LivemodeMismatch)));
    }
}
