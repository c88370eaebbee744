//! HTTP DTOs for payment and library endpoints.

use serde::Serialize;

use crate::domain::payment::{OwnershipRecord, Payment, PaymentItem, PaymentStatus};

#[derive(Debug, Clone, Serialize)]
pub struct PaymentItemResponse {
    pub item_id: String,
    pub price_at_payment_cents: i64,
}

impl From<PaymentItem> for PaymentItemResponse {
    fn from(item: PaymentItem) -> Self {
        Self {
            item_id: item.item_id.to_string(),
            price_at_payment_cents: item.price_at_payment.cents(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    /// Provider reference (payment intent id).
    pub external_reference: String,
    pub status: PaymentStatus,
    pub items: Vec<PaymentItemResponse>,
    pub created_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            order_id: payment.order_id.to_string(),
            amount_cents: payment.amount.cents(),
            external_reference: payment.external_reference.to_string(),
            status: payment.status,
            items: payment
                .items
                .into_iter()
                .map(PaymentItemResponse::from)
                .collect(),
            created_at: payment.created_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnedItemResponse {
    pub item_id: String,
    pub order_id: String,
    pub granted_at: String,
}

impl From<OwnershipRecord> for OwnedItemResponse {
    fn from(record: OwnershipRecord) -> Self {
        Self {
            item_id: record.item_id.to_string(),
            order_id: record.order_id.to_string(),
            granted_at: record.granted_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryResponse {
    pub items: Vec<OwnedItemResponse>,
}
