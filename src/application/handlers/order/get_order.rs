//! GetOrderHandler - Query handler for one order and its payment.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, UserId};
use crate::domain::order::{Order, OrderError};
use crate::domain::payment::Payment;
use crate::ports::{OrderRepository, PaymentRepository};

#[derive(Debug, Clone)]
pub struct GetOrderQuery {
    pub user_id: UserId,
    pub order_id: OrderId,
}

#[derive(Debug, Clone)]
pub struct GetOrderResult {
    pub order: Order,
    /// Present once the order is paid.
    pub payment: Option<Payment>,
}

/// Handler for reading an order. Only the owner may read it.
pub struct GetOrderHandler {
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl GetOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, payments: Arc<dyn PaymentRepository>) -> Self {
        Self { orders, payments }
    }

    pub async fn handle(&self, query: GetOrderQuery) -> Result<GetOrderResult, OrderError> {
        let order = self
            .orders
            .find_by_id(&query.order_id)
            .await?
            .ok_or_else(|| OrderError::not_found(query.order_id))?;

        if !order.is_owned_by(&query.user_id) {
            return Err(OrderError::not_authorized(query.order_id));
        }

        let payment = self.payments.find_by_order(&order.id).await?;
        Ok(GetOrderResult { order, payment })
    }
}
