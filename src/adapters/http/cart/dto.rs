//! HTTP DTOs for cart endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::ClearCartResult;
use crate::domain::cart::{CartItem, CartLine, CartView};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to add an item to the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCartItemRequest {
    pub item_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct CartLineResponse {
    pub item_id: String,
    pub title: String,
    pub price_cents: i64,
    /// When the item was added (ISO 8601).
    pub added_at: String,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            item_id: line.item_id.to_string(),
            title: line.title,
            price_cents: line.price.cents(),
            added_at: line.added_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub item_count: usize,
    pub total_cents: i64,
    /// Pending order the user can resume paying for.
    pub pending_order_id: Option<String>,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            item_count: view.item_count,
            total_cents: view.total.cents(),
            pending_order_id: view.pending_order_id.map(|id| id.to_string()),
            items: view.lines.into_iter().map(CartLineResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddCartItemResponse {
    pub item_id: String,
    pub added_at: String,
}

impl From<CartItem> for AddCartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            item_id: item.item_id.to_string(),
            added_at: item.added_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearCartResponse {
    pub removed: u64,
}

impl From<ClearCartResult> for ClearCartResponse {
    fn from(result: ClearCartResult) -> Self {
        Self {
            removed: result.removed,
        }
    }
}
