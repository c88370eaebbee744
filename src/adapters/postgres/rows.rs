//! Row types and conversions shared by the PostgreSQL repositories.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, ExternalReference, ItemId, Money, OrderId, PaymentId, Timestamp,
    UserId,
};
use crate::domain::order::{Order, OrderLineItem, OrderStatus};
use crate::domain::payment::{OwnershipRecord, Payment, PaymentItem, PaymentStatus};

/// Maps a sqlx error to a database `DomainError` with context.
pub(super) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// True if `e` is a unique violation of the named constraint or index.
pub(super) fn violates(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

fn corrupt(field: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} in database: {}", field, detail),
    )
}

pub(super) fn money(field: &str, cents: i64) -> Result<Money, DomainError> {
    Money::from_cents(cents).map_err(|e| corrupt(field, e))
}

pub(super) fn order_status(value: &str) -> Result<OrderStatus, DomainError> {
    value.parse().map_err(|e: String| corrupt("status", e))
}

pub(super) fn user_id(value: String) -> Result<UserId, DomainError> {
    UserId::new(value).map_err(|e| corrupt("user_id", e))
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OrderRow {
    pub id: Uuid,
    pub user_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct LineItemRow {
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub title: String,
    pub price_at_order_cents: i64,
}

impl TryFrom<LineItemRow> for OrderLineItem {
    type Error = DomainError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        Ok(OrderLineItem {
            item_id: ItemId::from_uuid(row.item_id),
            title: row.title,
            price_at_order: money("price_at_order_cents", row.price_at_order_cents)?,
        })
    }
}

impl OrderRow {
    /// Builds the order from its row and its line items (already in position order).
    pub fn into_order(self, lines: Vec<LineItemRow>) -> Result<Order, DomainError> {
        let status = order_status(&self.status)?;
        let line_items = lines
            .into_iter()
            .map(OrderLineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order::reconstitute(
            OrderId::from_uuid(self.id),
            user_id(self.user_id)?,
            status,
            line_items,
            Timestamp::from_datetime(self.created_at),
            Timestamp::from_datetime(self.updated_at),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PaymentRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: String,
    pub amount_cents: i64,
    pub external_reference: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PaymentItemRow {
    pub payment_id: Uuid,
    pub item_id: Uuid,
    pub price_at_payment_cents: i64,
}

impl PaymentRow {
    pub fn into_payment(self, items: Vec<PaymentItemRow>) -> Result<Payment, DomainError> {
        let status: PaymentStatus = self.status.parse().map_err(|e: String| corrupt("status", e))?;
        let items = items
            .into_iter()
            .map(|row| {
                Ok(PaymentItem {
                    item_id: ItemId::from_uuid(row.item_id),
                    price_at_payment: money("price_at_payment_cents", row.price_at_payment_cents)?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Payment {
            id: PaymentId::from_uuid(self.id),
            order_id: OrderId::from_uuid(self.order_id),
            user_id: user_id(self.user_id)?,
            amount: money("amount_cents", self.amount_cents)?,
            external_reference: ExternalReference::new(self.external_reference)
                .map_err(|e| corrupt("external_reference", e))?,
            status,
            items,
            created_at: Timestamp::from_datetime(self.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OwnershipRow {
    pub user_id: String,
    pub item_id: Uuid,
    pub order_id: Uuid,
    pub granted_at: DateTime<Utc>,
}

impl TryFrom<OwnershipRow> for OwnershipRecord {
    type Error = DomainError;

    fn try_from(row: OwnershipRow) -> Result<Self, Self::Error> {
        Ok(OwnershipRecord {
            user_id: user_id(row.user_id)?,
            item_id: ItemId::from_uuid(row.item_id),
            order_id: OrderId::from_uuid(row.order_id),
            granted_at: Timestamp::from_datetime(row.granted_at),
        })
    }
}
