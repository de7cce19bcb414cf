//! Authentication API endpoints

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ApiError;
use super::extract::{parse_json, AuthUser};
use super::AppState;
use crate::auth::accounts::AccountService;

/// Build auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/protected", get(protected))
}

/// Credentials for register and login
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Both fields present and non-empty
    fn require(self) -> Result<(String, String), ApiError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok((email.trim().to_string(), password))
            }
            _ => Err(ApiError::bad_request(
                "PARAM_MISSING",
                "Email and password are required",
            )),
        }
    }
}

/// Plain message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Identity response for the protected probe
#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub logged_in_as: String,
}

/// Register a new user
async fn register(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = parse_json::<CredentialsRequest>(&body)?.require()?;
    let service = AccountService::new(state.db.pool().clone());

    let user = service.register(&email, &password).await?;
    info!("Registered user {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            msg: "User registered successfully".to_string(),
        }),
    ))
}

/// Login with email and password
async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) = parse_json::<CredentialsRequest>(&body)?.require()?;
    let service = AccountService::new(state.db.pool().clone());

    let (_, token) = service.login(&email, &password).await?;
    Ok(Json(LoginResponse {
        access_token: token,
    }))
}

/// Invalidate the caller's token
async fn logout(State(state): State<AppState>, user: AuthUser) -> Result<Json<LogoutResponse>, ApiError> {
    let service = AccountService::new(state.db.pool().clone());
    let success = service.logout(&user.token).await?;
    Ok(Json(LogoutResponse { success }))
}

/// Echo the authenticated identity
async fn protected(user: AuthUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        logged_in_as: user.user_id.to_string(),
    })
}
