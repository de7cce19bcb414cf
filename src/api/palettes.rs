//! Palette and favorites endpoints

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::extract::{parse_json, AuthUser, PaletteId};
use super::AppState;
use crate::palettes::{NewPalette, PaletteSummary};

/// Build the palettes router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/palettes", get(list_palettes).post(create_palette))
        .route("/api/palettes/{id}", get(get_palette))
        .route("/api/palettes/{id}/favorite", post(toggle_favorite))
        .route("/api/user/favorites", get(user_favorites))
}

/// Create request
#[derive(Debug, Deserialize)]
pub struct CreatePaletteRequest {
    pub name: Option<String>,
    pub hex_list: Option<Vec<String>>,
    pub description: Option<String>,
}

/// Favorite toggle response
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub msg: &'static str,
    pub like_count: i64,
}

async fn list_palettes(State(state): State<AppState>) -> Result<Json<Vec<PaletteSummary>>, ApiError> {
    Ok(Json(state.palettes.list().await?))
}

async fn get_palette(
    State(state): State<AppState>,
    PaletteId(id): PaletteId,
) -> Result<Json<PaletteSummary>, ApiError> {
    Ok(Json(state.palettes.summary(id).await?))
}

async fn create_palette(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req: CreatePaletteRequest = parse_json(&body)?;

    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("PARAM_MISSING", "'name' is required."))?;
    let hex_list = req
        .hex_list
        .ok_or_else(|| ApiError::bad_request("PARAM_MISSING", "'hex_list' is required."))?;

    let palette = state
        .palettes
        .create(
            NewPalette {
                name,
                hex_list,
                description: req.description,
            },
            Some(user.user_id),
        )
        .await?;

    let summary = state.palettes.summary(palette.id).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    PaletteId(id): PaletteId,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let (action, like_count) = state.palettes.toggle_favorite(user.user_id, id).await?;
    Ok(Json(FavoriteResponse {
        msg: action.as_str(),
        like_count,
    }))
}

async fn user_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PaletteSummary>>, ApiError> {
    Ok(Json(state.palettes.favorites(user.user_id).await?))
}
