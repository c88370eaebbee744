//! Application layer.
//!
//! Handlers here sequence domain rules against the ports: commands change
//! carts, orders and payments; queries read them back for the HTTP layer.

pub mod handlers;

pub use handlers::*;
