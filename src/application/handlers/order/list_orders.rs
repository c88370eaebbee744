//! ListOrdersHandler - Query handler for a user's order history.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::order::{Order, OrderError};
use crate::ports::OrderRepository;

#[derive(Debug, Clone)]
pub struct ListOrdersQuery {
    pub user_id: UserId,
}

/// Handler for listing a user's orders, newest first, with line items.
pub struct ListOrdersHandler {
    orders: Arc<dyn OrderRepository>,
}

impl ListOrdersHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(&self, query: ListOrdersQuery) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_user(&query.user_id).await?)
    }
}
