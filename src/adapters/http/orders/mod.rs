//! HTTP adapter for order endpoints.
//!
//! - `POST /api/orders/checkout` - Turn the cart into a pending order and open payment
//! - `GET /api/orders` - List orders, newest first
//! - `GET /api/orders/:order_id` - One order with its payment
//! - `POST /api/orders/:order_id/cancel` - Cancel an unpaid order

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::order_routes;
