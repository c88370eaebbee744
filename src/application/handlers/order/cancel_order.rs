//! CancelOrderHandler - Command handler for a user canceling their unpaid order.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, UserId};
use crate::domain::order::{Order, OrderError, OrderStatus};
use crate::ports::OrderRepository;

/// Command to cancel an order.
#[derive(Debug, Clone)]
pub struct CancelOrderCommand {
    pub user_id: UserId,
    pub order_id: OrderId,
}

/// Handler for user-initiated cancellation.
///
/// Only a pending order can be canceled. The status write is
/// compare-and-set, so a cancel racing a payment confirmation loses
/// cleanly with `InvalidState` instead of overwriting `paid`.
pub struct CancelOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

impl CancelOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id, order_id = %cmd.order_id))]
    pub async fn handle(&self, cmd: CancelOrderCommand) -> Result<Order, OrderError> {
        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or_else(|| OrderError::not_found(cmd.order_id))?;

        if !order.is_owned_by(&cmd.user_id) {
            return Err(OrderError::not_authorized(cmd.order_id));
        }
        if !order.is_pending() {
            return Err(OrderError::invalid_state(order.id, order.status));
        }

        let canceled = self
            .orders
            .transition_status(&order.id, OrderStatus::Pending, OrderStatus::Canceled)
            .await?;
        if !canceled {
            let current = self
                .orders
                .find_by_id(&order.id)
                .await?
                .map(|o| o.status)
                .unwrap_or(order.status);
            return Err(OrderError::invalid_state(order.id, current));
        }

        order.cancel()?;
        tracing::info!(order_id = %order.id, "Order canceled by user");
        Ok(order)
    }
}
