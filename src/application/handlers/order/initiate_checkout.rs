//! InitiateCheckoutHandler - Command handler for turning a cart into a pending order.

use std::sync::Arc;

use crate::application::handlers::cart::GetCartHandler;
use crate::domain::cart::{CartItem, CartView};
use crate::domain::foundation::{OrderId, UserId};
use crate::domain::order::{Order, OrderError, OrderStatus};
use crate::ports::{
    CartRepository, CatalogReader, CheckoutSession, CheckoutSessionRequest, CreateOrderResult,
    OrderRepository, OwnershipLedger, PaymentGateway,
};

/// Attempts to cancel the order after a gateway failure before reporting it pending.
const CANCEL_ATTEMPTS: usize = 2;

/// Storefront-wide checkout settings passed to the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// ISO-4217 currency code, lowercase.
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// Command to check out the user's cart.
#[derive(Debug, Clone)]
pub struct InitiateCheckoutCommand {
    pub user_id: UserId,
    /// Pre-fills the provider's checkout page when known.
    pub customer_email: Option<String>,
}

/// Result of successful checkout initiation.
#[derive(Debug, Clone)]
pub struct InitiateCheckoutResult {
    pub order: Order,
    pub checkout_session: CheckoutSession,
}

/// Handler for checkout.
///
/// Steps:
/// 1. Refuse if the user already has a pending order
/// 2. Read the cart through the ownership sweep
/// 3. Refuse an empty cart
/// 4. Persist the order with price snapshots, then remove the ordered items
///    from the cart
/// 5. Open a checkout session; on failure cancel the order and put the items
///    back in the cart. An order that cannot be canceled is reported as still
///    pending so the caller can cancel it explicitly.
///
/// The order is durable before the cart is touched, so a crash between the
/// two leaves a pending order plus a cart that the single-pending rule keeps
/// from being checked out twice.
pub struct InitiateCheckoutHandler {
    cart_reader: GetCartHandler,
    cart: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl InitiateCheckoutHandler {
    pub fn new(
        cart: Arc<dyn CartRepository>,
        ownership: Arc<dyn OwnershipLedger>,
        catalog: Arc<dyn CatalogReader>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            cart_reader: GetCartHandler::new(cart.clone(), ownership, catalog, orders.clone()),
            cart,
            orders,
            gateway,
            settings,
        }
    }

    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn handle(
        &self,
        cmd: InitiateCheckoutCommand,
    ) -> Result<InitiateCheckoutResult, OrderError> {
        // 1. One pending order per user
        if let Some(existing) = self.orders.find_pending_for_user(&cmd.user_id).await? {
            return Err(OrderError::active_order_exists(existing.id));
        }

        // 2. Self-healing cart read
        let cart = self
            .cart_reader
            .purchasable(&cmd.user_id)
            .await
            .map_err(|e| OrderError::infrastructure(e.to_string()))?;

        // 3. Nothing to buy
        let order = Order::from_cart(&cart)?;

        // 4. Persist order, then take its items out of the cart
        match self.orders.create_pending(&order).await? {
            CreateOrderResult::Created => {}
            CreateOrderResult::PendingExists(existing) => {
                return Err(OrderError::active_order_exists(existing));
            }
        }
        let cart_cleared = self.remove_ordered_items(&order).await;

        // 5. Checkout session
        let request = CheckoutSessionRequest::for_order(
            &order,
            self.settings.currency.clone(),
            self.settings.success_url.clone(),
            self.settings.cancel_url.clone(),
            cmd.customer_email,
        );

        match self.gateway.create_checkout_session(request).await {
            Ok(checkout_session) => {
                tracing::info!(
                    order_id = %order.id,
                    total = %order.total,
                    items = order.line_items.len(),
                    session_id = %checkout_session.id,
                    "Checkout session created"
                );
                Ok(InitiateCheckoutResult {
                    order,
                    checkout_session,
                })
            }
            Err(e) => {
                tracing::error!(
                    order_id = %order.id,
                    code = %e.code,
                    error = %e.message,
                    "Checkout session creation failed; canceling order"
                );
                let canceled = self.cancel_unpaid(&order.id).await;
                let cart_restored = !cart_cleared || self.restore_cart(&cart).await;
                if canceled {
                    Err(OrderError::gateway_failed(order.id, e.message, cart_restored))
                } else {
                    Err(OrderError::gateway_failed_order_pending(
                        order.id,
                        e.message,
                        cart_restored,
                    ))
                }
            }
        }
    }

    /// Removes the ordered items from the cart. Returns false if the removal failed.
    async fn remove_ordered_items(&self, order: &Order) -> bool {
        match self
            .cart
            .remove_many(&order.user_id, &order.item_ids())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                // The pending order blocks a second checkout, so a leftover cart is harmless.
                tracing::warn!(
                    order_id = %order.id,
                    error = %e,
                    "Failed to clear cart after order creation"
                );
                false
            }
        }
    }

    /// Cancels the order left behind by a failed session. Returns false if the
    /// order is still pending after every attempt.
    async fn cancel_unpaid(&self, order_id: &OrderId) -> bool {
        for attempt in 1..=CANCEL_ATTEMPTS {
            match self
                .orders
                .transition_status(order_id, OrderStatus::Pending, OrderStatus::Canceled)
                .await
            {
                Ok(true) => return true,
                Ok(false) => {
                    tracing::warn!(
                        order_id = %order_id,
                        "Order was no longer pending when canceling after gateway failure"
                    );
                    return true;
                }
                Err(e) => tracing::error!(
                    order_id = %order_id,
                    attempt,
                    error = %e,
                    "Failed to cancel order after gateway failure"
                ),
            }
        }
        false
    }

    /// Puts the ordered items back. Returns true if every item was restored.
    async fn restore_cart(&self, cart: &CartView) -> bool {
        let mut restored = true;
        for line in &cart.lines {
            let item = CartItem {
                user_id: cart.user_id.clone(),
                item_id: line.item_id,
                added_at: line.added_at,
            };
            if let Err(e) = self.cart.add(&item).await {
                tracing::warn!(
                    user_id = %cart.user_id,
                    item_id = %line.item_id,
                    error = %e,
                    "Failed to restore cart item after gateway failure"
                );
                restored = false;
            }
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentGateway;
    use crate::domain::foundation::{ItemId, Money};
    use crate::ports::ORDER_ID_METADATA_KEY;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            currency: "usd".to_string(),
            success_url: "https://shop.test/success".to_string(),
            cancel_url: "https://shop.test/cancel".to_string(),
        }
    }

    fn handler(store: &Arc<InMemoryStore>, gateway: &Arc<MockPaymentGateway>) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            gateway.clone(),
            settings(),
        )
    }

    fn command() -> InitiateCheckoutCommand {
        InitiateCheckoutCommand {
            user_id: user(),
            customer_email: None,
        }
    }

    async fn put_in_cart(store: &InMemoryStore, title: &str, cents: i64) -> ItemId {
        let id = store.add_catalog_item(title, cents).unwrap();
        store.add(&CartItem::new(user(), id)).await.unwrap();
        id
    }

    async fn cart_rows(store: &InMemoryStore) -> Vec<CartItem> {
        CartRepository::list_for_user(store, &user()).await.unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Path
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_pending_order_with_snapshot_total() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        put_in_cart(&store, "A", 1000).await;
        put_in_cart(&store, "B", 500).await;

        let result = handler(&store, &gateway).handle(command()).await.unwrap();

        assert_eq!(result.order.status, OrderStatus::Pending);
        assert_eq!(result.order.total.cents(), 1500);
        assert_eq!(result.order.line_items.len(), 2);
        assert!(!result.checkout_session.url.is_empty());
    }

    #[tokio::test]
    async fn clears_cart_after_order_is_created() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        put_in_cart(&store, "A", 1000).await;

        handler(&store, &gateway).handle(command()).await.unwrap();

        assert!(cart_rows(&store).await.is_empty());
    }

    #[tokio::test]
    async fn passes_total_and_order_id_to_gateway() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        put_in_cart(&store, "A", 1000).await;

        let result = handler(&store, &gateway).handle(command()).await.unwrap();

        let requests = gateway.checkout_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].amount.cents(), 1000);
        assert_eq!(requests[0].currency, "usd");
        assert_eq!(
            requests[0].metadata.get(ORDER_ID_METADATA_KEY),
            Some(&result.order.id.to_string())
        );
    }

    #[tokio::test]
    async fn later_price_change_does_not_alter_order() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        let item = put_in_cart(&store, "A", 1000).await;

        let result = handler(&store, &gateway).handle(command()).await.unwrap();
        store.set_catalog_price(item, 9900).unwrap();

        let stored = OrderRepository::find_by_id(store.as_ref(), &result.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total.cents(), 1000);
        assert_eq!(stored.line_items[0].price_at_order.cents(), 1000);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Refusals
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn empty_cart_is_refused_without_side_effects() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());

        let err = handler(&store, &gateway).handle(command()).await.unwrap_err();

        assert_eq!(err, OrderError::EmptyCart);
        assert_eq!(store.pending_order_count(&user()).unwrap(), 0);
        assert_eq!(gateway.checkout_call_count(), 0);
    }

    #[tokio::test]
    async fn fully_owned_cart_is_empty_and_swept() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        let item = put_in_cart(&store, "A", 1000).await;
        store.record_ownership(&user(), item).unwrap();

        let err = handler(&store, &gateway).handle(command()).await.unwrap_err();

        assert_eq!(err, OrderError::EmptyCart);
        assert!(cart_rows(&store).await.is_empty());
    }

    #[tokio::test]
    async fn overflowing_total_is_refused_without_side_effects() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        put_in_cart(&store, "A", Money::MAX.cents()).await;
        put_in_cart(&store, "B", Money::MAX.cents()).await;

        let err = handler(&store, &gateway).handle(command()).await.unwrap_err();

        assert_eq!(err, OrderError::TotalTooLarge);
        assert_eq!(store.pending_order_count(&user()).unwrap(), 0);
        assert_eq!(gateway.checkout_call_count(), 0);
        assert_eq!(cart_rows(&store).await.len(), 2);
    }

    #[tokio::test]
    async fn existing_pending_order_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        put_in_cart(&store, "A", 1000).await;
        let handler = handler(&store, &gateway);
        let first = handler.handle(command()).await.unwrap();
        put_in_cart(&store, "B", 500).await;

        let err = handler.handle(command()).await.unwrap_err();

        assert_eq!(err, OrderError::ActiveOrderExists(first.order.id));
        assert_eq!(cart_rows(&store).await.len(), 1, "second cart untouched");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Gateway Failure Compensation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn gateway_failure_cancels_order_and_restores_cart() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::failing_checkout());
        let a = put_in_cart(&store, "A", 1000).await;
        let b = put_in_cart(&store, "B", 500).await;

        let err = handler(&store, &gateway).handle(command()).await.unwrap_err();

        let order_id = match err {
            OrderError::GatewayFailed {
                order_id,
                cart_restored,
                order_pending,
                ..
            } => {
                assert!(cart_restored);
                assert!(!order_pending);
                order_id
            }
            other => panic!("expected GatewayFailed, got {:?}", other),
        };
        let order = OrderRepository::find_by_id(store.as_ref(), &order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Canceled);
        assert_eq!(store.pending_order_count(&user()).unwrap(), 0);

        let mut restored: Vec<ItemId> = cart_rows(&store).await.iter().map(|r| r.item_id).collect();
        restored.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(restored, expected);
    }

    #[tokio::test]
    async fn uncancelable_order_is_reported_pending() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::failing_checkout());
        put_in_cart(&store, "A", 1000).await;
        store.fail_status_transitions(true);
        let handler = handler(&store, &gateway);

        let err = handler.handle(command()).await.unwrap_err();

        let order_id = match err {
            OrderError::GatewayFailed {
                order_id,
                cart_restored,
                order_pending,
                ..
            } => {
                assert!(order_pending);
                assert!(cart_restored);
                order_id
            }
            other => panic!("expected GatewayFailed, got {:?}", other),
        };
        assert_eq!(store.pending_order_count(&user()).unwrap(), 1);
        assert_eq!(cart_rows(&store).await.len(), 1);

        store.fail_status_transitions(false);
        gateway.restore_checkout();
        let retry = handler.handle(command()).await.unwrap_err();
        assert_eq!(retry, OrderError::ActiveOrderExists(order_id));
    }

    #[tokio::test]
    async fn retry_after_gateway_recovers_succeeds() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::failing_checkout());
        put_in_cart(&store, "A", 1000).await;
        let handler = handler(&store, &gateway);
        assert!(handler.handle(command()).await.is_err());

        gateway.restore_checkout();
        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result.order.total.cents(), 1000);
    }

    #[tokio::test]
    async fn gateway_error_reason_is_surfaced() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::failing_checkout());
        put_in_cart(&store, "A", 1000).await;

        let err = handler(&store, &gateway).handle(command()).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(err.message().contains("payment provider unavailable"));
        assert_eq!(
            gateway.checkout_requests().len(),
            1,
            "no internal retry of session creation"
        );
    }

    #[tokio::test]
    async fn cart_clear_failure_is_not_fatal() {
        let store = Arc::new(InMemoryStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        put_in_cart(&store, "A", 1000).await;
        store.fail_cart_removals(true);

        let result = handler(&store, &gateway).handle(command()).await;

        assert!(result.is_ok());
        assert_eq!(cart_rows(&store).await.len(), 1);
    }
}
