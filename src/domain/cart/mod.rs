//! Cart domain - a user's candidate purchase set.
//!
//! The cart is kept consistent with the ownership ledger on every read:
//! rows for items the user already owns are swept out before the cart is
//! priced or checked out.

mod errors;
mod view;

pub use errors::CartError;
pub use view::{CartItem, CartLine, CartView, OwnershipSweep};
