//! Cart-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | AlreadyOwned | 409 |
//! | AlreadyInCart | 409 |
//! | NotInCart | 404 |
//! | UnknownItem | 404 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, ItemId};

/// Errors raised by cart operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The user already owns a license for this item.
    AlreadyOwned(ItemId),

    /// The item is already in the user's cart.
    AlreadyInCart(ItemId),

    /// The item is not in the user's cart.
    NotInCart(ItemId),

    /// The item does not exist in the catalog.
    UnknownItem(ItemId),

    /// Infrastructure error.
    Infrastructure(String),
}

impl CartError {
    pub fn already_owned(item_id: ItemId) -> Self {
        CartError::AlreadyOwned(item_id)
    }

    pub fn already_in_cart(item_id: ItemId) -> Self {
        CartError::AlreadyInCart(item_id)
    }

    pub fn not_in_cart(item_id: ItemId) -> Self {
        CartError::NotInCart(item_id)
    }

    pub fn unknown_item(item_id: ItemId) -> Self {
        CartError::UnknownItem(item_id)
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CartError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CartError::AlreadyOwned(_) => ErrorCode::AlreadyOwned,
            CartError::AlreadyInCart(_) => ErrorCode::AlreadyInCart,
            CartError::NotInCart(_) => ErrorCode::CartItemNotFound,
            CartError::UnknownItem(_) => ErrorCode::CatalogItemNotFound,
            CartError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            CartError::AlreadyOwned(id) => format!("You already own item {}", id),
            CartError::AlreadyInCart(id) => format!("Item {} is already in your cart", id),
            CartError::NotInCart(id) => format!("Item {} not found in cart", id),
            CartError::UnknownItem(id) => format!("Item {} does not exist", id),
            CartError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns the item this error refers to, if any.
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            CartError::AlreadyOwned(id)
            | CartError::AlreadyInCart(id)
            | CartError::NotInCart(id)
            | CartError::UnknownItem(id) => Some(*id),
            CartError::Infrastructure(_) => None,
        }
    }
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CartError {}

impl From<DomainError> for CartError {
    fn from(err: DomainError) -> Self {
        CartError::Infrastructure(err.to_string())
    }
}

impl From<CartError> for DomainError {
    fn from(err: CartError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match err.item_id() {
            Some(id) => domain.with_detail("item_id", id.to_string()),
            None => domain,
        }
    }
}
