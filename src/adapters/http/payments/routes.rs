//! Axum router configuration for payment and library endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{list_library, list_payments, payment_webhook};
use crate::adapters::http::AppState;

/// Payment routes, mounted at `/api/payments`.
///
/// The webhook route takes no user identity; it is verified by signature.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments))
        .route("/webhook", post(payment_webhook))
}

/// Library routes, mounted at `/api/library`.
pub fn library_routes() -> Router<AppState> {
    Router::new().route("/", get(list_library))
}
