//! Request extractors shared by the handlers

use axum::{
    extract::{FromRequestParts, Path},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::AppState;
use crate::auth::accounts::AccountService;
use crate::auth::bearer_token;

/// Caller authenticated by an `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = bearer_token(header).ok_or_else(|| {
            ApiError::unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })?;

        let service = AccountService::new(state.db.pool().clone());
        let user = service
            .validate_token(token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            user_id: user.id,
            token: token.to_string(),
        })
    }
}

/// Palette id taken from the `{id}` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for PaletteId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::bad_request("INVALID_PARAM", "Palette id must be an integer.")
            })?;
        Ok(PaletteId(id))
    }
}

/// Parse a JSON request body, answering `INVALID_JSON` on failure
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::invalid_json())
}
