//! Axum router configuration for cart endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{add_item, clear_cart, get_cart, remove_item};
use crate::adapters::http::AppState;

/// Cart routes, mounted at `/api/cart`.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:item_id", delete(remove_item))
}
