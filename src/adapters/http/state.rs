//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::application::handlers::{
    AddCartItemHandler, CancelOrderHandler, CheckoutSettings, ClearCartHandler, GetCartHandler,
    GetOrderHandler, HandlePaymentWebhookHandler, InitiateCheckoutHandler, ListOrdersHandler,
    ListOwnedItemsHandler, ListPaymentsHandler, ReconcilePaymentHandler, RemoveCartItemHandler,
};
use crate::ports::{
    CartRepository, CatalogReader, OrderRepository, OwnershipLedger, PaymentGateway,
    PaymentRepository,
};

/// Application state containing all dependencies.
///
/// Cloned per request; every dependency is behind an `Arc`. Handlers are
/// built on demand from the shared ports.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogReader>,
    pub cart: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub ownership: Arc<dyn OwnershipLedger>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub checkout: CheckoutSettings,
}

impl AppState {
    // Cart

    pub fn get_cart_handler(&self) -> GetCartHandler {
        GetCartHandler::new(
            self.cart.clone(),
            self.ownership.clone(),
            self.catalog.clone(),
            self.orders.clone(),
        )
    }

    pub fn add_cart_item_handler(&self) -> AddCartItemHandler {
        AddCartItemHandler::new(
            self.catalog.clone(),
            self.ownership.clone(),
            self.cart.clone(),
        )
    }

    pub fn remove_cart_item_handler(&self) -> RemoveCartItemHandler {
        RemoveCartItemHandler::new(self.cart.clone())
    }

    pub fn clear_cart_handler(&self) -> ClearCartHandler {
        ClearCartHandler::new(self.cart.clone())
    }

    // Orders

    pub fn checkout_handler(&self) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(
            self.cart.clone(),
            self.ownership.clone(),
            self.catalog.clone(),
            self.orders.clone(),
            self.gateway.clone(),
            self.checkout.clone(),
        )
    }

    pub fn get_order_handler(&self) -> GetOrderHandler {
        GetOrderHandler::new(self.orders.clone(), self.payments.clone())
    }

    pub fn list_orders_handler(&self) -> ListOrdersHandler {
        ListOrdersHandler::new(self.orders.clone())
    }

    pub fn cancel_order_handler(&self) -> CancelOrderHandler {
        CancelOrderHandler::new(self.orders.clone())
    }

    // Payments

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        let reconciler = Arc::new(ReconcilePaymentHandler::new(
            self.orders.clone(),
            self.payments.clone(),
            self.cart.clone(),
        ));
        HandlePaymentWebhookHandler::new(self.gateway.clone(), self.orders.clone(), reconciler)
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.payments.clone())
    }

    pub fn list_owned_items_handler(&self) -> ListOwnedItemsHandler {
        ListOwnedItemsHandler::new(self.ownership.clone())
    }
}
