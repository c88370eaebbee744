//! Cart rows and the priced, ownership-filtered cart view.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::{ItemId, Money, OrderId, Timestamp, UserId};

/// A stored cart row. Unique per `(user_id, item_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub added_at: Timestamp,
}

impl CartItem {
    pub fn new(user_id: UserId, item_id: ItemId) -> Self {
        Self {
            user_id,
            item_id,
            added_at: Timestamp::now(),
        }
    }
}

/// A cart row joined with its current catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub title: String,
    pub price: Money,
    pub added_at: Timestamp,
}

/// Stored cart rows split by ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipSweep {
    /// Rows the user does not own yet.
    pub purchasable: Vec<CartItem>,
    /// Rows for items the ledger says the user already owns.
    pub stale: Vec<ItemId>,
}

impl OwnershipSweep {
    /// Splits cart rows into purchasable rows and rows that are already owned.
    pub fn split(items: Vec<CartItem>, owned: &HashSet<ItemId>) -> Self {
        let (stale, purchasable): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| owned.contains(&item.item_id));
        Self {
            purchasable,
            stale: stale.into_iter().map(|item| item.item_id).collect(),
        }
    }
}

/// What a user sees when reading their cart.
///
/// Built after the ownership sweep, so it never contains owned items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartView {
    pub user_id: UserId,
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub item_count: usize,
    /// Pending order the user can resume paying for, if any.
    pub pending_order_id: Option<OrderId>,
}

impl CartView {
    /// Prices purchasable rows against the catalog.
    ///
    /// Rows without a catalog entry are not purchasable and are left out.
    /// Lines keep the order in which items were added.
    pub fn price(
        user_id: UserId,
        mut items: Vec<CartItem>,
        catalog: &[CatalogItem],
        pending_order_id: Option<OrderId>,
    ) -> Self {
        let by_id: HashMap<ItemId, &CatalogItem> =
            catalog.iter().map(|entry| (entry.id, entry)).collect();

        items.sort_by_key(|item| item.added_at);

        let lines: Vec<CartLine> = items
            .into_iter()
            .filter_map(|item| {
                by_id.get(&item.item_id).map(|entry| CartLine {
                    item_id: item.item_id,
                    title: entry.title.clone(),
                    price: entry.price,
                    added_at: item.added_at,
                })
            })
            .collect();

        let total = lines.iter().map(|line| line.price).sum();

        Self {
            user_id,
            item_count: lines.len(),
            lines,
            total,
            pending_order_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.lines.iter().map(|line| line.item_id).collect()
    }
}
