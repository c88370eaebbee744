//! API error type that converts domain errors to HTTP responses.
//!
//! # Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | AlreadyOwned, AlreadyInCart, ActiveOrderExists, InvalidState | 409 |
//! | NotInCart, UnknownItem, Order NotFound | 404 |
//! | NotAuthorized | 403 |
//! | EmptyCart, TotalTooLarge | 422 |
//! | GatewayFailed | 502 |
//! | Malformed request | 400 |
//! | Infrastructure | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::cart::CartError;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::order::OrderError;

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Error returned by every user-facing endpoint.
#[derive(Debug)]
pub enum ApiError {
    Cart(CartError),
    Order(OrderError),
    Domain(DomainError),
    /// Malformed path or body.
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Cart(err) => match err {
                CartError::AlreadyOwned(_) | CartError::AlreadyInCart(_) => StatusCode::CONFLICT,
                CartError::NotInCart(_) | CartError::UnknownItem(_) => StatusCode::NOT_FOUND,
                CartError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Order(err) => match err {
                OrderError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderError::NotAuthorized(_) => StatusCode::FORBIDDEN,
                OrderError::ActiveOrderExists(_) | OrderError::InvalidState { .. } => {
                    StatusCode::CONFLICT
                }
                OrderError::EmptyCart | OrderError::TotalTooLarge => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                OrderError::GatewayFailed { .. } => StatusCode::BAD_GATEWAY,
                OrderError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Domain(err) => match err.code {
                ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
                ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorCode::Forbidden => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Cart(CartError::Infrastructure(_))
            | ApiError::Order(OrderError::Infrastructure(_)) => internal_error(),
            ApiError::Domain(_) if self.status_code().is_server_error() => internal_error(),
            ApiError::Cart(err) => match err.item_id() {
                Some(item_id) => ErrorResponse::with_details(
                    err.code().to_string(),
                    err.message(),
                    serde_json::json!({ "item_id": item_id }),
                ),
                None => ErrorResponse::new(err.code().to_string(), err.message()),
            },
            ApiError::Order(err) => {
                let details = match err {
                    OrderError::GatewayFailed {
                        order_id,
                        cart_restored,
                        order_pending,
                        ..
                    } => Some(serde_json::json!({
                        "order_id": order_id,
                        "cart_restored": cart_restored,
                        "order_pending": order_pending,
                    })),
                    OrderError::InvalidState { order_id, current } => Some(serde_json::json!({
                        "order_id": order_id,
                        "status": current,
                    })),
                    other => other
                        .order_id()
                        .map(|order_id| serde_json::json!({ "order_id": order_id })),
                };
                match details {
                    Some(details) => {
                        ErrorResponse::with_details(err.code().to_string(), err.message(), details)
                    }
                    None => ErrorResponse::new(err.code().to_string(), err.message()),
                }
            }
            ApiError::Domain(err) => {
                if err.details.is_empty() {
                    ErrorResponse::new(err.code.to_string(), err.message())
                } else {
                    ErrorResponse::with_details(
                        err.code.to_string(),
                        err.message(),
                        serde_json::json!(err.details),
                    )
                }
            }
            ApiError::BadRequest(message) => {
                ErrorResponse::new(ErrorCode::ValidationFailed.to_string(), message.clone())
            }
        }
    }
}

fn internal_error() -> ErrorResponse {
    ErrorResponse::new(ErrorCode::InternalError.to_string(), "Internal server error")
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, status = %status, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
