//! Axum router configuration for order endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{cancel_order, checkout, get_order, list_orders};
use crate::adapters::http::AppState;

/// Order routes, mounted at `/api/orders`.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
        .route("/:order_id", get(get_order))
        .route("/:order_id/cancel", post(cancel_order))
}
