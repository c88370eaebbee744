//! HTTP adapter for cart endpoints.
//!
//! - `GET /api/cart` - Current cart, already-owned items swept out
//! - `POST /api/cart/items` - Add an item
//! - `DELETE /api/cart/items/:item_id` - Remove an item
//! - `DELETE /api/cart` - Empty the cart

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::cart_routes;
