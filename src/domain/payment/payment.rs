//! Payment records and ownership grants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    ExternalReference, ItemId, Money, OrderId, PaymentId, Timestamp, UserId,
};
use crate::domain::order::Order;

/// Status of a recorded payment.
///
/// Reconciliation only ever records `Successful` payments. The other
/// statuses exist for provider-side refunds and reversals, which are
/// handled outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Successful,
    Canceled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Successful => "successful",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "successful" => Ok(PaymentStatus::Successful),
            "canceled" => Ok(PaymentStatus::Canceled),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

/// Per-line breakdown of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentItem {
    pub item_id: ItemId,
    pub price_at_payment: Money,
}

/// A reconciled payment.
///
/// # Invariants
///
/// - `external_reference` is unique across all payments
/// - at most one payment per order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub amount: Money,
    pub external_reference: ExternalReference,
    pub status: PaymentStatus,
    pub items: Vec<PaymentItem>,
    pub created_at: Timestamp,
}

impl Payment {
    /// Builds the successful payment for an order, one item per order line.
    ///
    /// `amount` is what the provider reports as charged, which may differ from
    /// the order total.
    pub fn successful_for(
        order: &Order,
        external_reference: ExternalReference,
        amount: Money,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            order_id: order.id,
            user_id: order.user_id.clone(),
            amount,
            external_reference,
            status: PaymentStatus::Successful,
            items: order
                .line_items
                .iter()
                .map(|line| PaymentItem {
                    item_id: line.item_id,
                    price_at_payment: line.price_at_order,
                })
                .collect(),
            created_at: Timestamp::now(),
        }
    }
}

/// Permanent record that a user owns an item. Unique per `(user_id, item_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub order_id: OrderId,
    pub granted_at: Timestamp,
}

impl OwnershipRecord {
    /// Grants for every line of a paid order.
    pub fn for_order(order: &Order) -> Vec<Self> {
        let now = Timestamp::now();
        order
            .line_items
            .iter()
            .map(|line| Self {
                user_id: order.user_id.clone(),
                item_id: line.item_id,
                order_id: order.id,
                granted_at: now,
            })
            .collect()
    }
}
