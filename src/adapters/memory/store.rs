//! In-memory storefront store.
//!
//! One mutex-guarded state implements every storage port, so the same
//! uniqueness rules the database enforces (one cart row per item, one
//! pending order per user, unique payment references, unique grants) hold
//! here as well. Each port call takes the lock once, which makes it atomic.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::cart::CartItem;
use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::{
    DomainError, ErrorCode, ExternalReference, ItemId, Money, OrderId, Timestamp, UserId,
};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::payment::{
    ApplyOutcome, OwnershipRecord, Payment, PaymentConfirmation,
};
use crate::ports::{
    CartInsertResult, CartRepository, CatalogReader, CreateOrderResult, OrderRepository,
    OwnershipLedger, PaymentRepository,
};

#[derive(Default)]
struct State {
    catalog: HashMap<ItemId, CatalogItem>,
    cart: Vec<CartItem>,
    orders: HashMap<OrderId, Order>,
    payments: Vec<Payment>,
    ownership: Vec<OwnershipRecord>,
}

/// In-memory implementation of the storage ports.
///
/// Suitable for tests and local runs without a database.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_cart_removals: AtomicBool,
    fail_status_transitions: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "in-memory store lock poisoned"))
    }

    fn check_cart_removal(&self) -> Result<(), DomainError> {
        if self.fail_cart_removals.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated cart removal failure"));
        }
        Ok(())
    }

    fn check_status_transition(&self) -> Result<(), DomainError> {
        if self.fail_status_transitions.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated order status update failure"));
        }
        Ok(())
    }

    // === Seeding and inspection helpers ===

    /// Adds a catalog entry and returns its id.
    pub fn add_catalog_item(&self, title: &str, price_cents: i64) -> Result<ItemId, DomainError> {
        let id = ItemId::new();
        let item = CatalogItem::new(id, title, Money::from_cents(price_cents)?);
        self.lock()?.catalog.insert(id, item);
        Ok(id)
    }

    /// Changes the current catalog price of an item.
    pub fn set_catalog_price(&self, item_id: ItemId, price_cents: i64) -> Result<(), DomainError> {
        let price = Money::from_cents(price_cents)?;
        if let Some(item) = self.lock()?.catalog.get_mut(&item_id) {
            item.price = price;
        }
        Ok(())
    }

    /// Records a grant directly, as if a purchase completed elsewhere.
    pub fn record_ownership(&self, user_id: &UserId, item_id: ItemId) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let exists = state
            .ownership
            .iter()
            .any(|r| &r.user_id == user_id && r.item_id == item_id);
        if !exists {
            state.ownership.push(OwnershipRecord {
                user_id: user_id.clone(),
                item_id,
                order_id: OrderId::new(),
                granted_at: Timestamp::now(),
            });
        }
        Ok(())
    }

    /// Makes cart removals fail until reset.
    pub fn fail_cart_removals(&self, fail: bool) {
        self.fail_cart_removals.store(fail, Ordering::SeqCst);
    }

    /// Makes order status transitions fail until reset.
    pub fn fail_status_transitions(&self, fail: bool) {
        self.fail_status_transitions.store(fail, Ordering::SeqCst);
    }

    pub fn payment_count(&self) -> Result<usize, DomainError> {
        Ok(self.lock()?.payments.len())
    }

    pub fn ownership_count(&self, user_id: &UserId) -> Result<usize, DomainError> {
        Ok(self
            .lock()?
            .ownership
            .iter()
            .filter(|r| &r.user_id == user_id)
            .count())
    }

    pub fn pending_order_count(&self, user_id: &UserId) -> Result<usize, DomainError> {
        Ok(self
            .lock()?
            .orders
            .values()
            .filter(|o| &o.user_id == user_id && o.status == OrderStatus::Pending)
            .count())
    }
}

#[async_trait]
impl CatalogReader for InMemoryStore {
    async fn find_by_id(&self, item_id: &ItemId) -> Result<Option<CatalogItem>, DomainError> {
        Ok(self.lock()?.catalog.get(item_id).cloned())
    }

    async fn find_by_ids(&self, item_ids: &[ItemId]) -> Result<Vec<CatalogItem>, DomainError> {
        let state = self.lock()?;
        Ok(item_ids
            .iter()
            .filter_map(|id| state.catalog.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn add(&self, item: &CartItem) -> Result<CartInsertResult, DomainError> {
        let mut state = self.lock()?;
        let exists = state
            .cart
            .iter()
            .any(|row| row.user_id == item.user_id && row.item_id == item.item_id);
        if exists {
            return Ok(CartInsertResult::AlreadyPresent);
        }
        state.cart.push(item.clone());
        Ok(CartInsertResult::Added)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<CartItem>, DomainError> {
        let mut rows: Vec<CartItem> = self
            .lock()?
            .cart
            .iter()
            .filter(|row| &row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.added_at);
        Ok(rows)
    }

    async fn remove(&self, user_id: &UserId, item_id: &ItemId) -> Result<bool, DomainError> {
        self.check_cart_removal()?;
        let mut state = self.lock()?;
        let before = state.cart.len();
        state
            .cart
            .retain(|row| !(&row.user_id == user_id && &row.item_id == item_id));
        Ok(state.cart.len() < before)
    }

    async fn remove_many(&self, user_id: &UserId, item_ids: &[ItemId]) -> Result<u64, DomainError> {
        self.check_cart_removal()?;
        let targets: HashSet<&ItemId> = item_ids.iter().collect();
        let mut state = self.lock()?;
        let before = state.cart.len();
        state
            .cart
            .retain(|row| !(&row.user_id == user_id && targets.contains(&row.item_id)));
        Ok((before - state.cart.len()) as u64)
    }

    async fn clear(&self, user_id: &UserId) -> Result<u64, DomainError> {
        self.check_cart_removal()?;
        let mut state = self.lock()?;
        let before = state.cart.len();
        state.cart.retain(|row| &row.user_id != user_id);
        Ok((before - state.cart.len()) as u64)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_pending(&self, order: &Order) -> Result<CreateOrderResult, DomainError> {
        let mut state = self.lock()?;
        let existing = state
            .orders
            .values()
            .find(|o| o.user_id == order.user_id && o.status == OrderStatus::Pending)
            .map(|o| o.id);
        if let Some(existing) = existing {
            return Ok(CreateOrderResult::PendingExists(existing));
        }
        state.orders.insert(order.id, order.clone());
        Ok(CreateOrderResult::Created)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.lock()?.orders.get(id).cloned())
    }

    async fn find_pending_for_user(&self, user_id: &UserId) -> Result<Option<Order>, DomainError> {
        Ok(self
            .lock()?
            .orders
            .values()
            .find(|o| &o.user_id == user_id && o.status == OrderStatus::Pending)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<Order> = self
            .lock()?
            .orders
            .values()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn transition_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, DomainError> {
        self.check_status_transition()?;
        let mut state = self.lock()?;
        match state.orders.get_mut(id) {
            Some(order) if order.status == from => {
                match to {
                    OrderStatus::Paid => order.mark_paid()?,
                    OrderStatus::Canceled => order.cancel()?,
                    OrderStatus::Pending => {
                        return Err(DomainError::new(
                            ErrorCode::InvalidStateTransition,
                            "Orders cannot return to pending",
                        ))
                    }
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn apply(
        &self,
        order: &Order,
        confirmation: &PaymentConfirmation,
    ) -> Result<ApplyOutcome, DomainError> {
        let mut state = self.lock()?;

        let status = match state.orders.get(&confirmation.order_id) {
            Some(stored) => stored.status,
            None => return Ok(ApplyOutcome::OrderNotFound),
        };
        match status {
            OrderStatus::Pending => {}
            OrderStatus::Paid => return Ok(ApplyOutcome::OrderAlreadyPaid),
            other => return Ok(ApplyOutcome::OrderNotPayable(other)),
        }

        let duplicate = state
            .payments
            .iter()
            .any(|p| p.external_reference == confirmation.external_reference);
        if duplicate {
            return Ok(ApplyOutcome::DuplicateReference);
        }

        // All guards passed; the writes below cannot fail.
        if let Some(stored) = state.orders.get_mut(&confirmation.order_id) {
            stored.mark_paid()?;
        }

        let payment = Payment::successful_for(
            order,
            confirmation.external_reference.clone(),
            confirmation.amount,
        );
        state.payments.push(payment.clone());

        for grant in OwnershipRecord::for_order(order) {
            let exists = state
                .ownership
                .iter()
                .any(|r| r.user_id == grant.user_id && r.item_id == grant.item_id);
            if !exists {
                state.ownership.push(grant);
            }
        }

        Ok(ApplyOutcome::Applied(payment))
    }

    async fn find_by_external_reference(
        &self,
        reference: &ExternalReference,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .lock()?
            .payments
            .iter()
            .find(|p| &p.external_reference == reference)
            .cloned())
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .lock()?
            .payments
            .iter()
            .find(|p| &p.order_id == order_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Payment>, DomainError> {
        let mut payments: Vec<Payment> = self
            .lock()?
            .payments
            .iter()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }
}

#[async_trait]
impl OwnershipLedger for InMemoryStore {
    async fn owns(&self, user_id: &UserId, item_id: &ItemId) -> Result<bool, DomainError> {
        Ok(self
            .lock()?
            .ownership
            .iter()
            .any(|r| &r.user_id == user_id && &r.item_id == item_id))
    }

    async fn owned_among(
        &self,
        user_id: &UserId,
        item_ids: &[ItemId],
    ) -> Result<HashSet<ItemId>, DomainError> {
        let wanted: HashSet<&ItemId> = item_ids.iter().collect();
        Ok(self
            .lock()?
            .ownership
            .iter()
            .filter(|r| &r.user_id == user_id && wanted.contains(&r.item_id))
            .map(|r| r.item_id)
            .collect())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<OwnershipRecord>, DomainError> {
        let mut records: Vec<OwnershipRecord> = self
            .lock()?
            .ownership
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.granted_at.cmp(&a.granted_at));
        Ok(records)
    }
}
