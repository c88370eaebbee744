//! Stripe adapter.
//!
//! - [`StripePaymentGateway`] - Checkout sessions over the Stripe REST API
//! - [`StripeWebhookVerifier`] - `Stripe-Signature` verification
//! - [`MockPaymentGateway`] - Configurable gateway for tests and local runs

mod mock_payment_gateway;
mod stripe_adapter;
mod stripe_event;
mod webhook_verifier;

pub use mock_payment_gateway::MockPaymentGateway;
pub use stripe_adapter::{StripeConfig, StripePaymentGateway};
pub use stripe_event::{checkout_event_json, StripeCheckoutSession, StripeEvent, StripeEventType};
pub use webhook_verifier::{signature_header, SignatureHeader, StripeWebhookVerifier};
