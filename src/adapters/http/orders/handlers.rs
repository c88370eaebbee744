//! HTTP handlers for order endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    CancelOrderCommand, GetOrderQuery, InitiateCheckoutCommand, ListOrdersQuery,
};
use crate::domain::foundation::OrderId;

use super::dto::{
    CheckoutRequest, CheckoutResponse, OrderDetailResponse, OrderListResponse, OrderResponse,
};
use crate::adapters::http::{ApiError, AppState, AuthenticatedUser};

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid order id: {}", raw)))
}

/// POST /api/orders/checkout
///
/// The body is optional; an absent or unreadable body checks out without
/// a customer email.
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Option<Json<CheckoutRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let result = state
        .checkout_handler()
        .handle(InitiateCheckoutCommand {
            user_id: user.user_id,
            customer_email: request.customer_email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(result))))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .list_orders_handler()
        .handle(ListOrdersQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(OrderListResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}

/// GET /api/orders/:order_id
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = parse_order_id(&order_id)?;

    let result = state
        .get_order_handler()
        .handle(GetOrderQuery {
            user_id: user.user_id,
            order_id,
        })
        .await?;

    Ok(Json(OrderDetailResponse::from(result)))
}

/// POST /api/orders/:order_id/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = parse_order_id(&order_id)?;

    let order = state
        .cancel_order_handler()
        .handle(CancelOrderCommand {
            user_id: user.user_id,
            order_id,
        })
        .await?;

    Ok(Json(OrderResponse::from(order)))
}
