//! HTTP adapter for payment endpoints.
//!
//! - `GET /api/payments` - The user's payments, newest first
//! - `POST /api/payments/webhook` - Payment provider webhook (signature verified, no user auth)
//! - `GET /api/library` - Items the user owns, newest grant first

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::{library_routes, payment_routes};
