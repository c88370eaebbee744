//! Caller identity extraction.
//!
//! Credentials are issued and checked upstream; requests arrive here with
//! the authenticated user in the `X-User-Id` header.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::domain::foundation::UserId;

use super::error::ErrorResponse;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Authenticated user context extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
#[derive(Debug)]
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| UserId::new(s.trim()).ok())
            .ok_or(AuthenticationRequired)?;

        Ok(AuthenticatedUser { user_id })
    }
}
