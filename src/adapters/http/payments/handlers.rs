//! HTTP handlers for payment and library endpoints.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::{
    HandlePaymentWebhookCommand, ListOwnedItemsQuery, ListPaymentsQuery,
};

use super::dto::{LibraryResponse, OwnedItemResponse, PaymentListResponse, PaymentResponse};
use crate::adapters::http::{ApiError, AppState, AuthenticatedUser, ErrorResponse};

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state
        .list_payments_handler()
        .handle(ListPaymentsQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(PaymentListResponse {
        payments: payments.into_iter().map(PaymentResponse::from).collect(),
    }))
}

/// GET /api/library
pub async fn list_library(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .list_owned_items_handler()
        .handle(ListOwnedItemsQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(LibraryResponse {
        items: records.into_iter().map(OwnedItemResponse::from).collect(),
    }))
}

/// POST /api/payments/webhook
///
/// The raw body is passed through untouched; the signature covers exact
/// bytes. Verified events are acknowledged with 200 whatever the
/// reconciliation outcome, so the provider stops retrying. Only storage
/// failures return 5xx.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match state.webhook_handler().handle(cmd).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!(code = e.code(), error = %e, "Webhook processing failed");
            } else {
                tracing::warn!(code = e.code(), error = %e, "Webhook rejected");
            }
            let message = if status.is_server_error() {
                "Internal server error".to_string()
            } else {
                e.to_string()
            };
            (status, Json(ErrorResponse::new(e.code(), message))).into_response()
        }
    }
}
