//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::stripe::StripeConfig;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: SecretString,

    /// Override for the Stripe API base URL (stripe-mock, proxies)
    #[serde(default)]
    pub stripe_api_base_url: Option<String>,

    /// Reject webhook events whose livemode flag does not match the key
    #[serde(default)]
    pub require_livemode: bool,

    /// Timeout for Stripe API calls in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the Stripe adapter configuration.
    pub fn stripe_config(&self) -> StripeConfig {
        let config = StripeConfig::new(
            self.stripe_api_key.clone(),
            self.stripe_webhook_secret.clone(),
        )
        .with_require_livemode(self.require_livemode)
        .with_request_timeout(self.request_timeout());

        match &self.stripe_api_base_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        }
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Restricted keys (rk_) cannot create checkout sessions
        if !api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, webhook_secret: &str) -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: SecretString::new(api_key.to_string()),
            stripe_webhook_secret: SecretString::new(webhook_secret.to_string()),
            stripe_api_base_url: None,
            require_livemode: false,
            request_timeout_secs: default_request_timeout(),
        }
    }

    #[test]
    fn test_is_test_mode() {
        let config = config("sk_test_xxx", "whsec_xxx");
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
    }

    #[test]
    fn test_is_live_mode() {
        let config = config("sk_live_xxx", "whsec_xxx");
        assert!(config.is_live_mode());
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_validation_missing_api_key() {
        assert!(matches!(
            config("", "whsec_xxx").validate(),
            Err(ValidationError::MissingRequired("STRIPE_API_KEY"))
        ));
    }

    #[test]
    fn test_validation_missing_webhook_secret() {
        assert!(matches!(
            config("sk_test_xxx", "").validate(),
            Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"))
        ));
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        assert!(matches!(
            config("pk_test_xxx", "whsec_xxx").validate(),
            Err(ValidationError::InvalidStripeKey)
        ));
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        assert!(matches!(
            config("sk_test_xxx", "secret_xxx").validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        ));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config("sk_test_abcd1234", "whsec_xyz789").validate().is_ok());
    }

    #[test]
    fn debug_output_does_not_leak_secrets() {
        let rendered = format!("{:?}", config("sk_test_very_secret", "whsec_also_secret"));
        assert!(!rendered.contains("very_secret"));
        assert!(!rendered.contains("also_secret"));
    }
}
