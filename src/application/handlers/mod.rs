//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, grouped
//! by module: cart, order, and payment.

pub mod cart;
pub mod order;
pub mod payment;

pub use cart::{
    AddCartItemCommand, AddCartItemHandler, AddCartItemResult, ClearCartCommand,
    ClearCartHandler, ClearCartResult, GetCartHandler, GetCartQuery, GetCartResult,
    RemoveCartItemCommand, RemoveCartItemHandler,
};
pub use order::{
    CancelOrderCommand, CancelOrderHandler, CheckoutSettings, GetOrderHandler, GetOrderQuery,
    GetOrderResult, InitiateCheckoutCommand, InitiateCheckoutHandler, InitiateCheckoutResult,
    ListOrdersHandler, ListOrdersQuery,
};
pub use payment::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    ListOwnedItemsHandler, ListOwnedItemsQuery, ListPaymentsHandler, ListPaymentsQuery,
    ReconcilePaymentCommand, ReconcilePaymentHandler,
};
