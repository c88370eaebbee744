//! Webhook error types.
//!
//! Every condition that stops a webhook delivery from being processed, with
//! HTTP status mapping and retryability semantics for the provider.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature header was not sent.
    #[error("Missing signature header")]
    MissingSignature,

    /// Webhook timestamp is outside the acceptable window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required metadata field missing from webhook event.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Event came from the wrong provider mode (test vs live).
    #[error("Livemode mismatch")]
    LivemodeMismatch,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Maps the error to an HTTP status code.
    ///
    /// Status codes determine provider retry behavior:
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::MissingSignature
            | WebhookError::TimestampOutOfRange => StatusCode::UNAUTHORIZED,

            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_)
            | WebhookError::LivemodeMismatch => StatusCode::BAD_REQUEST,

            WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable code for responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::TimestampOutOfRange => "TIMESTAMP_OUT_OF_RANGE",
            WebhookError::InvalidTimestamp => "INVALID_TIMESTAMP",
            WebhookError::ParseError(_) => "PARSE_ERROR",
            WebhookError::MissingMetadata(_) => "MISSING_METADATA",
            WebhookError::MissingField(_) => "MISSING_FIELD",
            WebhookError::LivemodeMismatch => "LIVEMODE_MISMATCH",
            WebhookError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
