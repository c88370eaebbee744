//! Cart handlers.
//!
//! ## Commands
//! - Adding and removing items
//! - Clearing the cart
//!
//! ## Queries
//! - Reading the cart (sweeps out already-owned items)

mod add_item;
mod clear_cart;
mod get_cart;
mod remove_item;

// Commands
pub use add_item::{AddCartItemCommand, AddCartItemHandler, AddCartItemResult};
pub use clear_cart::{ClearCartCommand, ClearCartHandler, ClearCartResult};
pub use remove_item::{RemoveCartItemCommand, RemoveCartItemHandler};

// Queries
pub use get_cart::{GetCartHandler, GetCartQuery, GetCartResult};
