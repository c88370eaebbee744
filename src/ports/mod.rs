//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `CartRepository` - Cart rows, unique per user and item
//! - `OrderRepository` - Orders with the single-pending-order guarantee
//! - `PaymentRepository` - Atomic reconciliation writes and payment reads
//! - `OwnershipLedger` - Read side of the ownership grants
//! - `CatalogReader` - Current catalog prices
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Hosted checkout sessions and webhook verification

mod cart_repository;
mod catalog_reader;
mod order_repository;
mod ownership_ledger;
mod payment_gateway;
mod payment_repository;

pub use cart_repository::{CartInsertResult, CartRepository};
pub use catalog_reader::CatalogReader;
pub use order_repository::{CreateOrderResult, OrderRepository};
pub use ownership_ledger::OwnershipLedger;
pub use payment_gateway::{
    CheckoutLine, CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentErrorCode,
    PaymentGateway, ORDER_ID_METADATA_KEY,
};
pub use payment_repository::PaymentRepository;
