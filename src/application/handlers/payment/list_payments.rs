//! ListPaymentsHandler - Query handler for a user's payment history.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::payment::Payment;
use crate::ports::PaymentRepository;

#[derive(Debug, Clone)]
pub struct ListPaymentsQuery {
    pub user_id: UserId,
}

/// Lists a user's payments, newest first, with their items.
pub struct ListPaymentsHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl ListPaymentsHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<Vec<Payment>, DomainError> {
        self.payments.list_for_user(&query.user_id).await
    }
}
