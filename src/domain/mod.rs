//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `catalog` - Read-only catalog prices used at checkout
//! - `cart` - Candidate purchase set, swept against ownership on read
//! - `order` - Order aggregate and its status state machine
//! - `payment` - Payments, ownership grants, and reconciliation outcomes

pub mod cart;
pub mod catalog;
pub mod foundation;
pub mod order;
pub mod payment;
