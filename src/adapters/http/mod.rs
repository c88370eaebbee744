//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure:
//! - `cart` - `/api/cart`
//! - `orders` - `/api/orders`
//! - `payments` - `/api/payments`, `/api/library`, and the provider webhook
//!
//! Identity comes from the upstream-authenticated `X-User-Id` header; see
//! [`AuthenticatedUser`].

pub mod auth;
pub mod cart;
pub mod error;
pub mod orders;
pub mod payments;
mod state;

pub use auth::AuthenticatedUser;
pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Builds the complete API router.
///
/// # Example
///
/// ```ignore
/// let app = api_router(state);
/// let listener = tokio::net::TcpListener::bind(addr).await?;
/// axum::serve(listener, app).await?;
/// ```
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/cart", cart::cart_routes())
        .nest("/api/orders", orders::order_routes())
        .nest("/api/payments", payments::payment_routes())
        .nest("/api/library", payments::library_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
