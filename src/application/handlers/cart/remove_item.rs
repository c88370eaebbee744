//! RemoveCartItemHandler - Command handler for taking an item out of a cart.

use std::sync::Arc;

use crate::domain::cart::CartError;
use crate::domain::foundation::{ItemId, UserId};
use crate::ports::CartRepository;

/// Command to remove one item from the user's cart.
#[derive(Debug, Clone)]
pub struct RemoveCartItemCommand {
    pub user_id: UserId,
    pub item_id: ItemId,
}

pub struct RemoveCartItemHandler {
    cart: Arc<dyn CartRepository>,
}

impl RemoveCartItemHandler {
    pub fn new(cart: Arc<dyn CartRepository>) -> Self {
        Self { cart }
    }

    /// Removes the item, or fails with `NotInCart` if it was not there.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id, item_id = %cmd.item_id))]
    pub async fn handle(&self, cmd: RemoveCartItemCommand) -> Result<(), CartError> {
        if self.cart.remove(&cmd.user_id, &cmd.item_id).await? {
            Ok(())
        } else {
            Err(CartError::not_in_cart(cmd.item_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::cart::CartItem;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn removes_item_in_cart() {
        let store = Arc::new(InMemoryStore::new());
        let item_id = store.add_catalog_item("A", 100).unwrap();
        store.add(&CartItem::new(user(), item_id)).await.unwrap();

        RemoveCartItemHandler::new(store.clone())
            .handle(RemoveCartItemCommand { user_id: user(), item_id })
            .await
            .unwrap();

        let rows = CartRepository::list_for_user(store.as_ref(), &user()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn missing_item_is_not_in_cart() {
        let store = Arc::new(InMemoryStore::new());
        let item_id = ItemId::new();

        let err = RemoveCartItemHandler::new(store)
            .handle(RemoveCartItemCommand { user_id: user(), item_id })
            .await
            .unwrap_err();

        assert_eq!(err, CartError::NotInCart(item_id));
    }

    #[tokio::test]
    async fn only_touches_the_requesting_users_cart() {
        let store = Arc::new(InMemoryStore::new());
        let item_id = store.add_catalog_item("A", 100).unwrap();
        let other = UserId::new("user-2").unwrap();
        store.add(&CartItem::new(other.clone(), item_id)).await.unwrap();

        let result = RemoveCartItemHandler::new(store.clone())
            .handle(RemoveCartItemCommand { user_id: user(), item_id })
            .await;

        assert!(result.is_err());
        let rows = CartRepository::list_for_user(store.as_ref(), &other).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
