//! HTTP DTOs for order endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::payments::PaymentResponse;
use crate::application::handlers::{GetOrderResult, InitiateCheckoutResult};
use crate::domain::order::{Order, OrderLineItem, OrderStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Optional checkout body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    /// Pre-fills the provider's checkout page.
    #[serde(default)]
    pub customer_email: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct OrderLineResponse {
    pub item_id: String,
    pub title: String,
    pub price_at_order_cents: i64,
}

impl From<OrderLineItem> for OrderLineResponse {
    fn from(line: OrderLineItem) -> Self {
        Self {
            item_id: line.item_id.to_string(),
            title: line.title,
            price_at_order_cents: line.price_at_order.cents(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub line_items: Vec<OrderLineResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            status: order.status,
            total_cents: order.total.cents(),
            line_items: order
                .line_items
                .into_iter()
                .map(OrderLineResponse::from)
                .collect(),
            created_at: order.created_at.as_datetime().to_rfc3339(),
            updated_at: order.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for checkout initiation.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    /// Hosted payment page to redirect the customer to.
    pub checkout_url: String,
    pub session_id: String,
    pub expires_at: Option<i64>,
}

impl From<InitiateCheckoutResult> for CheckoutResponse {
    fn from(result: InitiateCheckoutResult) -> Self {
        Self {
            order: OrderResponse::from(result.order),
            checkout_url: result.checkout_session.url,
            session_id: result.checkout_session.id,
            expires_at: result.checkout_session.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub payment: Option<PaymentResponse>,
}

impl From<GetOrderResult> for OrderDetailResponse {
    fn from(result: GetOrderResult) -> Self {
        Self {
            order: OrderResponse::from(result.order),
            payment: result.payment.map(PaymentResponse::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
}
