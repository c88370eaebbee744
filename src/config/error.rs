//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host or port")]
    InvalidAddress,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid timeout")]
    InvalidTimeout,

    #[error("Wildcard CORS origin is not allowed in production")]
    WildcardCorsInProduction,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Currency must be a three-letter ISO code")]
    InvalidCurrency,

    #[error("Checkout return URL must be absolute")]
    InvalidReturnUrl,

    #[error("Checkout return URLs must use HTTPS in production")]
    ReturnUrlMustBeHttps,
}
