//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum REST API
//! - `memory` - In-process store for tests and local runs
//! - `postgres` - PostgreSQL repositories
//! - `stripe` - Stripe Checkout gateway and webhook verification

pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
