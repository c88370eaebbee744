//! Order-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | NotAuthorized | 403 |
//! | ActiveOrderExists | 409 |
//! | EmptyCart | 422 |
//! | TotalTooLarge | 422 |
//! | InvalidState | 409 |
//! | GatewayFailed | 502 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, Money, OrderId};

use super::OrderStatus;

/// Errors raised by checkout and order operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Order was not found.
    NotFound(OrderId),

    /// Requester does not own the order.
    NotAuthorized(OrderId),

    /// The user already has a pending order; resume it instead.
    ActiveOrderExists(OrderId),

    /// Nothing purchasable in the cart.
    EmptyCart,

    /// The cart total is above the largest amount an order can carry.
    TotalTooLarge,

    /// Operation not valid in the order's current status.
    InvalidState {
        order_id: OrderId,
        current: OrderStatus,
    },

    /// The payment provider could not create a checkout session.
    ///
    /// `cart_restored` tells the caller whether the items went back into the
    /// cart. `order_pending` is set when the order could not be canceled and
    /// still blocks checkout until the user cancels it.
    GatewayFailed {
        order_id: OrderId,
        reason: String,
        cart_restored: bool,
        order_pending: bool,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl OrderError {
    pub fn not_found(order_id: OrderId) -> Self {
        OrderError::NotFound(order_id)
    }

    pub fn not_authorized(order_id: OrderId) -> Self {
        OrderError::NotAuthorized(order_id)
    }

    pub fn active_order_exists(order_id: OrderId) -> Self {
        OrderError::ActiveOrderExists(order_id)
    }

    pub fn invalid_state(order_id: OrderId, current: OrderStatus) -> Self {
        OrderError::InvalidState { order_id, current }
    }

    pub fn gateway_failed(order_id: OrderId, reason: impl Into<String>, cart_restored: bool) -> Self {
        OrderError::GatewayFailed {
            order_id,
            reason: reason.into(),
            cart_restored,
            order_pending: false,
        }
    }

    /// Gateway failure where the order itself could not be canceled.
    pub fn gateway_failed_order_pending(
        order_id: OrderId,
        reason: impl Into<String>,
        cart_restored: bool,
    ) -> Self {
        OrderError::GatewayFailed {
            order_id,
            reason: reason.into(),
            cart_restored,
            order_pending: true,
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        OrderError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::NotFound(_) => ErrorCode::OrderNotFound,
            OrderError::NotAuthorized(_) => ErrorCode::Forbidden,
            OrderError::ActiveOrderExists(_) => ErrorCode::ActiveOrderExists,
            OrderError::EmptyCart => ErrorCode::EmptyCart,
            OrderError::TotalTooLarge => ErrorCode::ValidationFailed,
            OrderError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            OrderError::GatewayFailed { .. } => ErrorCode::PaymentGatewayError,
            OrderError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            OrderError::NotFound(id) => format!("Order not found: {}", id),
            OrderError::NotAuthorized(id) => {
                format!("You are not allowed to access order {}", id)
            }
            OrderError::ActiveOrderExists(id) => {
                format!("You already have a pending order {}; complete or cancel it first", id)
            }
            OrderError::EmptyCart => "Cart has no purchasable items".to_string(),
            OrderError::TotalTooLarge => format!(
                "Cart total exceeds the maximum order amount of {}",
                Money::MAX
            ),
            OrderError::InvalidState { order_id, current } => {
                format!("Order {} is {} and can no longer change", order_id, current)
            }
            OrderError::GatewayFailed {
                order_id,
                reason,
                order_pending: true,
                ..
            } => format!(
                "Payment provider unavailable ({}); order {} is still pending, cancel it before checking out again",
                reason, order_id
            ),
            OrderError::GatewayFailed {
                reason,
                cart_restored,
                ..
            } => {
                if *cart_restored {
                    format!(
                        "Payment provider unavailable ({}); your items are back in your cart",
                        reason
                    )
                } else {
                    format!(
                        "Payment provider unavailable ({}); your cart was cleared, please re-add items",
                        reason
                    )
                }
            }
            OrderError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns the order this error refers to, if any.
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            OrderError::NotFound(id)
            | OrderError::NotAuthorized(id)
            | OrderError::ActiveOrderExists(id) => Some(*id),
            OrderError::InvalidState { order_id, .. }
            | OrderError::GatewayFailed { order_id, .. } => Some(*order_id),
            OrderError::EmptyCart
            | OrderError::TotalTooLarge
            | OrderError::Infrastructure(_) => None,
        }
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrderError::Infrastructure(_)
                | OrderError::GatewayFailed {
                    order_pending: false,
                    ..
                }
        )
    }
}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for OrderError {}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        OrderError::Infrastructure(err.to_string())
    }
}

impl From<OrderError> for DomainError {
    fn from(err: OrderError) -> Self {
        let mut domain = DomainError::new(err.code(), err.message());
        if let Some(id) = err.order_id() {
            domain = domain.with_detail("order_id", id.to_string());
        }
        if let OrderError::GatewayFailed {
            cart_restored,
            order_pending,
            ..
        } = &err
        {
            domain = domain
                .with_detail("cart_restored", cart_restored.to_string())
                .with_detail("order_pending", order_pending.to_string());
        }
        domain
    }
}
