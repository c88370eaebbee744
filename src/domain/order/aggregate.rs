//! Order aggregate entity.
//!
//! An order is an immutable, priced snapshot of a cart. Only its status
//! changes after creation, and only through the [`OrderStatus`] state machine.
//!
//! # Design Decisions
//!
//! - **Price at checkout**: line items copy the catalog price when the order
//!   is created and never re-read it
//! - **Money in cents**: all monetary values are [`Money`] (i64 cents)
//! - **One pending per user**: enforced by the order store, not here
//! - **Never deleted**: orders only move to a terminal status

use serde::{Deserialize, Serialize};

use crate::domain::cart::CartView;
use crate::domain::foundation::{
    DomainError, ErrorCode, ItemId, Money, OrderId, StateMachine, Timestamp, UserId,
};

use super::{OrderError, OrderStatus};

/// Immutable line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub item_id: ItemId,
    pub title: String,
    pub price_at_order: Money,
}

/// Order aggregate.
///
/// # Invariants
///
/// - `line_items` is non-empty and never changes after creation
/// - `total` equals the sum of `price_at_order` over `line_items`
/// - `status` transitions follow [`OrderStatus`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Money,
    pub line_items: Vec<OrderLineItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Creates a pending order from a swept, priced cart.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` if the cart has nothing purchasable, and
    /// `TotalTooLarge` if the line prices add up past `Money::MAX`.
    pub fn from_cart(cart: &CartView) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let line_items: Vec<OrderLineItem> = cart
            .lines
            .iter()
            .map(|line| OrderLineItem {
                item_id: line.item_id,
                title: line.title.clone(),
                price_at_order: line.price,
            })
            .collect();
        let total = Money::checked_sum(line_items.iter().map(|line| line.price_at_order))
            .map_err(|_| OrderError::TotalTooLarge)?;

        let now = Timestamp::now();
        Ok(Self {
            id: OrderId::new(),
            user_id: cart.user_id.clone(),
            status: OrderStatus::Pending,
            total,
            line_items,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds an order from storage.
    pub fn reconstitute(
        id: OrderId,
        user_id: UserId,
        status: OrderStatus,
        line_items: Vec<OrderLineItem>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            status,
            total: line_items.iter().map(|line| line.price_at_order).sum(),
            line_items,
            created_at,
            updated_at,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.line_items.iter().map(|line| line.item_id).collect()
    }

    /// Marks the order paid.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is pending.
    pub fn mark_paid(&mut self) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Paid)
    }

    /// Cancels the order.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is pending.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Canceled)
    }

    fn transition_to(&mut self, target: OrderStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition order from {} to {}", self.status, target),
            )
            .with_detail("order_id", self.id.to_string())
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartItem;
    use crate::domain::catalog::CatalogItem;

    fn user() -> UserId {
        UserId::new("user-123").unwrap()
    }

    fn cents(c: i64) -> Money {
        Money::from_cents(c).unwrap()
    }

    fn cart_with(prices: &[i64]) -> CartView {
        let mut items = Vec::new();
        let mut catalog = Vec::new();
        for (i, price) in prices.iter().enumerate() {
            let id = ItemId::new();
            items.push(CartItem::new(user(), id));
            catalog.push(CatalogItem::new(id, format!("Movie {}", i), cents(*price)));
        }
        CartView::price(user(), items, &catalog, None)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Construction
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn from_cart_snapshots_prices_and_total() {
        let order = Order::from_cart(&cart_with(&[1000, 500])).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, cents(1500));
        assert_eq!(order.line_items.len(), 2);
        assert!(order.is_owned_by(&user()));
    }

    #[test]
    fn from_cart_rejects_empty_cart() {
        let result = Order::from_cart(&cart_with(&[]));
        assert_eq!(result, Err(OrderError::EmptyCart));
    }

    #[test]
    fn from_cart_rejects_total_above_max() {
        let max = Money::MAX.cents();

        let result = Order::from_cart(&cart_with(&[max, max]));

        assert_eq!(result, Err(OrderError::TotalTooLarge));
        assert_eq!(Order::from_cart(&cart_with(&[max])).unwrap().total, Money::MAX);
    }

    #[test]
    fn reconstitute_recomputes_total_from_lines() {
        let lines = vec![
            OrderLineItem {
                item_id: ItemId::new(),
                title: "A".into(),
                price_at_order: cents(250),
            },
            OrderLineItem {
                item_id: ItemId::new(),
                title: "B".into(),
                price_at_order: cents(750),
            },
        ];
        let now = Timestamp::now();
        let order = Order::reconstitute(OrderId::new(), user(), OrderStatus::Paid, lines, now, now);
        assert_eq!(order.total, cents(1000));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Transitions
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn mark_paid_from_pending_succeeds() {
        let mut order = Order::from_cart(&cart_with(&[1000])).unwrap();
        order.mark_paid().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn cancel_after_paid_fails_with_invalid_transition() {
        let mut order = Order::from_cart(&cart_with(&[1000])).unwrap();
        order.mark_paid().unwrap();

        let err = order.cancel().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn pay_after_cancel_fails() {
        let mut order = Order::from_cart(&cart_with(&[1000])).unwrap();
        order.cancel().unwrap();
        assert!(order.mark_paid().is_err());
    }

    #[test]
    fn is_owned_by_rejects_other_user() {
        let order = Order::from_cart(&cart_with(&[1000])).unwrap();
        assert!(!order.is_owned_by(&UserId::new("someone-else").unwrap()));
    }
}
