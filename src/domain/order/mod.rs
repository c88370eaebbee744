//! Order domain - priced, immutable snapshots of a cart.
//!
//! Status lifecycle:
//!
//! ```text
//! pending ──► paid       (payment reconciled)
//!    │
//!    └──────► canceled   (user, provider expiry, or failed checkout session)
//! ```

mod aggregate;
mod errors;
mod status;

pub use aggregate::{Order, OrderLineItem};
pub use errors::OrderError;
pub use status::OrderStatus;
