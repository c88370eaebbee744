//! ClearCartHandler - Command handler for emptying a cart.

use std::sync::Arc;

use crate::domain::cart::CartError;
use crate::domain::foundation::UserId;
use crate::ports::CartRepository;

#[derive(Debug, Clone)]
pub struct ClearCartCommand {
    pub user_id: UserId,
}

/// Result of clearing a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearCartResult {
    /// Rows deleted; zero when the cart was already empty.
    pub removed: u64,
}

/// Handler for clearing a cart. Idempotent: clearing an empty cart succeeds.
pub struct ClearCartHandler {
    cart: Arc<dyn CartRepository>,
}

impl ClearCartHandler {
    pub fn new(cart: Arc<dyn CartRepository>) -> Self {
        Self { cart }
    }

    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn handle(&self, cmd: ClearCartCommand) -> Result<ClearCartResult, CartError> {
        let removed = self.cart.clear(&cmd.user_id).await?;
        Ok(ClearCartResult { removed })
    }
}
