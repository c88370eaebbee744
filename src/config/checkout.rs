//! Checkout configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::application::handlers::CheckoutSettings;

/// Storefront checkout settings passed to the payment provider
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// ISO-4217 currency code for all prices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Where the provider sends the customer after paying
    pub success_url: String,

    /// Where the provider sends the customer after backing out
    pub cancel_url: String,
}

impl CheckoutConfig {
    /// Converts into the settings the checkout handler uses.
    pub fn settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            currency: self.currency.to_ascii_lowercase(),
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }

    /// Validate checkout configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }
        for url in [&self.success_url, &self.cancel_url] {
            if url.is_empty() {
                return Err(ValidationError::MissingRequired("CHECKOUT_RETURN_URL"));
            }
            let https = url.starts_with("https://");
            if !https && !url.starts_with("http://") {
                return Err(ValidationError::InvalidReturnUrl);
            }
            if *environment == Environment::Production && !https {
                return Err(ValidationError::ReturnUrlMustBeHttps);
            }
        }
        Ok(())
    }
}

fn default_currency() -> String {
    "usd".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CheckoutConfig {
        CheckoutConfig {
            currency: "USD".to_string(),
            success_url: "http://localhost:5173/checkout/success".to_string(),
            cancel_url: "http://localhost:5173/cart".to_string(),
        }
    }

    #[test]
    fn settings_lowercase_the_currency() {
        assert_eq!(config().settings().currency, "usd");
    }

    #[test]
    fn http_urls_are_allowed_outside_production() {
        assert!(config().validate(&Environment::Development).is_ok());
    }

    #[test]
    fn production_requires_https_return_urls() {
        assert!(matches!(
            config().validate(&Environment::Production),
            Err(ValidationError::ReturnUrlMustBeHttps)
        ));
    }

    #[test]
    fn invalid_currency_is_rejected() {
        let config = CheckoutConfig {
            currency: "dollars".to_string(),
            ..config()
        };
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidCurrency)
        ));
    }

    #[test]
    fn relative_url_is_rejected() {
        let config = CheckoutConfig {
            cancel_url: "/cart".to_string(),
            ..config()
        };
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidReturnUrl)
        ));
    }
}
