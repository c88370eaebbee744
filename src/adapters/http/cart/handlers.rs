//! HTTP handlers for cart endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    AddCartItemCommand, ClearCartCommand, GetCartQuery, RemoveCartItemCommand,
};
use crate::domain::foundation::ItemId;

use super::dto::{AddCartItemRequest, AddCartItemResponse, CartResponse, ClearCartResponse};
use crate::adapters::http::{ApiError, AppState, AuthenticatedUser};

fn parse_item_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid item id: {}", raw)))
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .get_cart_handler()
        .handle(GetCartQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(CartResponse::from(view)))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AddCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item_id = parse_item_id(&request.item_id)?;

    let result = state
        .add_cart_item_handler()
        .handle(AddCartItemCommand {
            user_id: user.user_id,
            item_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AddCartItemResponse::from(result.item))))
}

/// DELETE /api/cart/items/:item_id
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item_id = parse_item_id(&item_id)?;

    state
        .remove_cart_item_handler()
        .handle(RemoveCartItemCommand {
            user_id: user.user_id,
            item_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/cart
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .clear_cart_handler()
        .handle(ClearCartCommand {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(ClearCartResponse::from(result)))
}
