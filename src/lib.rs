//! Reelstore - storefront backend for digital movie licenses.
//!
//! A user fills a cart, checks out into a pending order priced at checkout
//! time, pays on the provider's hosted page, and is granted ownership when
//! the provider's webhook is reconciled. Reconciliation is idempotent per
//! provider payment reference.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
