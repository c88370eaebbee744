//! Order handlers.
//!
//! ## Commands
//! - Checking out a cart into a pending order with a payment session
//! - Canceling an unpaid order
//!
//! ## Queries
//! - Get one order (owner only)
//! - List a user's orders

mod cancel_order;
mod get_order;
mod initiate_checkout;
mod list_orders;

// Commands
pub use cancel_order::{CancelOrderCommand, CancelOrderHandler};
pub use initiate_checkout::{
    CheckoutSettings, InitiateCheckoutCommand, InitiateCheckoutHandler, InitiateCheckoutResult,
};

// Queries
pub use get_order::{GetOrderHandler, GetOrderQuery, GetOrderResult};
pub use list_orders::{ListOrdersHandler, ListOrdersQuery};
