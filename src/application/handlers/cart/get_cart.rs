//! GetCartHandler - Query handler for the self-healing cart read.

use std::sync::Arc;

use crate::domain::cart::{CartError, CartView, OwnershipSweep};
use crate::domain::foundation::UserId;
use crate::ports::{CartRepository, CatalogReader, OrderRepository, OwnershipLedger};

/// Query for a user's cart.
#[derive(Debug, Clone)]
pub struct GetCartQuery {
    pub user_id: UserId,
}

pub type GetCartResult = CartView;

/// Handler for reading a cart.
///
/// Every read sweeps out rows for items the user already owns, so a cart
/// left stale by an interrupted reconciliation heals itself. The sweep
/// deletes those rows; if the delete fails the rows are still hidden from
/// the returned view and the next read tries again.
pub struct GetCartHandler {
    cart: Arc<dyn CartRepository>,
    ownership: Arc<dyn OwnershipLedger>,
    catalog: Arc<dyn CatalogReader>,
    orders: Arc<dyn OrderRepository>,
}

impl GetCartHandler {
    pub fn new(
        cart: Arc<dyn CartRepository>,
        ownership: Arc<dyn OwnershipLedger>,
        catalog: Arc<dyn CatalogReader>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            cart,
            ownership,
            catalog,
            orders,
        }
    }

    #[tracing::instrument(skip(self, query), fields(user_id = %query.user_id))]
    pub async fn handle(&self, query: GetCartQuery) -> Result<GetCartResult, CartError> {
        let mut view = self.purchasable(&query.user_id).await?;
        view.pending_order_id = self
            .orders
            .find_pending_for_user(&query.user_id)
            .await?
            .map(|order| order.id);
        Ok(view)
    }

    /// Reads, sweeps, and prices the cart. `pending_order_id` is left empty.
    pub async fn purchasable(&self, user_id: &UserId) -> Result<CartView, CartError> {
        let rows = self.cart.list_for_user(user_id).await?;
        if rows.is_empty() {
            return Ok(CartView::price(user_id.clone(), rows, &[], None));
        }

        let item_ids: Vec<_> = rows.iter().map(|row| row.item_id).collect();
        let owned = self.ownership.owned_among(user_id, &item_ids).await?;
        let sweep = OwnershipSweep::split(rows, &owned);

        if !sweep.stale.is_empty() {
            match self.cart.remove_many(user_id, &sweep.stale).await {
                Ok(removed) => tracing::info!(
                    user_id = %user_id,
                    removed,
                    "Removed already-owned items from cart"
                ),
                Err(e) => tracing::warn!(
                    user_id = %user_id,
                    stale = sweep.stale.len(),
                    error = %e,
                    "Failed to remove already-owned items from cart"
                ),
            }
        }

        let purchasable_ids: Vec<_> = sweep.purchasable.iter().map(|row| row.item_id).collect();
        let catalog = self.catalog.find_by_ids(&purchasable_ids).await?;

        Ok(CartView::price(
            user_id.clone(),
            sweep.purchasable,
            &catalog,
            None,
        ))
    }
}
