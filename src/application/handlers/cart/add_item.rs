//! AddCartItemHandler - Command handler for putting a catalog item in a cart.

use std::sync::Arc;

use crate::domain::cart::{CartError, CartItem};
use crate::domain::foundation::{ItemId, UserId};
use crate::ports::{CartInsertResult, CartRepository, CatalogReader, OwnershipLedger};

/// Command to add an item to the user's cart.
#[derive(Debug, Clone)]
pub struct AddCartItemCommand {
    pub user_id: UserId,
    pub item_id: ItemId,
}

/// Result of a successful add.
#[derive(Debug, Clone)]
pub struct AddCartItemResult {
    pub item: CartItem,
}

/// Handler for adding items to a cart.
///
/// Refuses items the user already owns and items already in the cart.
/// The cart row uniqueness is enforced by the repository, so two
/// concurrent adds of the same item produce one row and one conflict.
pub struct AddCartItemHandler {
    catalog: Arc<dyn CatalogReader>,
    ownership: Arc<dyn OwnershipLedger>,
    cart: Arc<dyn CartRepository>,
}

impl AddCartItemHandler {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        ownership: Arc<dyn OwnershipLedger>,
        cart: Arc<dyn CartRepository>,
    ) -> Self {
        Self {
            catalog,
            ownership,
            cart,
        }
    }

    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id, item_id = %cmd.item_id))]
    pub async fn handle(&self, cmd: AddCartItemCommand) -> Result<AddCartItemResult, CartError> {
        // 1. Item must exist in the catalog
        if self.catalog.find_by_id(&cmd.item_id).await?.is_none() {
            return Err(CartError::unknown_item(cmd.item_id));
        }

        // 2. Owned items cannot be bought again
        if self.ownership.owns(&cmd.user_id, &cmd.item_id).await? {
            return Err(CartError::already_owned(cmd.item_id));
        }

        // 3. Insert, relying on the (user, item) uniqueness
        let item = CartItem::new(cmd.user_id, cmd.item_id);
        match self.cart.add(&item).await? {
            CartInsertResult::Added => Ok(AddCartItemResult { item }),
            CartInsertResult::AlreadyPresent => Err(CartError::already_in_cart(cmd.item_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn handler(store: &Arc<InMemoryStore>) -> AddCartItemHandler {
        AddCartItemHandler::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn adds_catalog_item_to_cart() {
        let store = Arc::new(InMemoryStore::new());
        let item_id = store.add_catalog_item("Alien", 1000).unwrap();

        let result = handler(&store)
            .handle(AddCartItemCommand { user_id: user(), item_id })
            .await
            .unwrap();

        assert_eq!(result.item.item_id, item_id);
        let rows = CartRepository::list_for_user(store.as_ref(), &user()).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn second_add_is_already_in_cart() {
        let store = Arc::new(InMemoryStore::new());
        let item_id = store.add_catalog_item("Alien", 1000).unwrap();
        let handler = handler(&store);
        handler
            .handle(AddCartItemCommand { user_id: user(), item_id })
            .await
            .unwrap();

        let err = handler
            .handle(AddCartItemCommand { user_id: user(), item_id })
            .await
            .unwrap_err();

        assert_eq!(err, CartError::AlreadyInCart(item_id));
    }

    #[tokio::test]
    async fn owned_item_is_refused() {
        let store = Arc::new(InMemoryStore::new());
        let item_id = store.add_catalog_item("Alien", 1000).unwrap();
        store.record_ownership(&user(), item_id).unwrap();

        let err = handler(&store)
            .handle(AddCartItemCommand { user_id: user(), item_id })
            .await
            .unwrap_err();

        assert_eq!(err, CartError::AlreadyOwned(item_id));
        let rows = CartRepository::list_for_user(store.as_ref(), &user()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn unknown_item_is_refused() {
        let store = Arc::new(InMemoryStore::new());
        let item_id = ItemId::new();

        let err = handler(&store)
            .handle(AddCartItemCommand { user_id: user(), item_id })
            .await
            .unwrap_err();

        assert_eq!(err, CartError::UnknownItem(item_id));
    }

    #[tokio::test]
    async fn another_users_ownership_does_not_block() {
        let store = Arc::new(InMemoryStore::new());
        let item_id = store.add_catalog_item("Alien", 1000).unwrap();
        store
            .record_ownership(&UserId::new("someone-else").unwrap(), item_id)
            .unwrap();

        assert!(handler(&store)
            .handle(AddCartItemCommand { user_id: user(), item_id })
            .await
            .is_ok());
    }
}
