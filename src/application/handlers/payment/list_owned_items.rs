//! ListOwnedItemsHandler - Query handler for a user's library.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::payment::OwnershipRecord;
use crate::ports::OwnershipLedger;

#[derive(Debug, Clone)]
pub struct ListOwnedItemsQuery {
    pub user_id: UserId,
}

/// Lists every item the user owns, newest grant first.
pub struct ListOwnedItemsHandler {
    ownership: Arc<dyn OwnershipLedger>,
}

impl ListOwnedItemsHandler {
    pub fn new(ownership: Arc<dyn OwnershipLedger>) -> Self {
        Self { ownership }
    }

    pub async fn handle(&self, query: ListOwnedItemsQuery) -> Result<Vec<OwnershipRecord>, DomainError> {
        self.ownership.list_for_user(&query.user_id).await
    }
}
