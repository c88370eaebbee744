//! Catalog view used by the checkout core.
//!
//! Catalog management lives elsewhere; this module only models the
//! read-only price information the cart and checkout need.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ItemId, Money};

/// A purchasable catalog entry with its current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub price: Money,
}

impl CatalogItem {
    pub fn new(id: ItemId, title: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            title: title.into(),
            price,
        }
    }
}
