//! Wire error type for HTTP handlers
//!
//! Every failed request answers with `{"error_code": ..., "message": ...}`.
//! Domain errors are translated here and nowhere else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::auth::accounts::AuthError;
use crate::color::ColorError;
use crate::generation::GenerationError;
use crate::palettes::PaletteError;
use crate::stability::ProviderError;

/// Message returned for anything that should not leak details
const INTERNAL_MESSAGE: &str = "An unexpected error occurred.";

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_code: &'static str,
    pub message: String,
}

/// HTTP error with a machine-readable code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn invalid_json() -> Self {
        Self::bad_request("INVALID_JSON", "Invalid JSON payload.")
    }

    /// Log the cause server-side and hide it from the client
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!("Unhandled error: {}", cause);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error_code: self.code,
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ColorError> for ApiError {
    fn from(err: ColorError) -> Self {
        match err {
            ColorError::Empty => Self::bad_request("EMPTY_COLORS", "'hex_list' cannot be empty."),
            ColorError::InvalidFormat(_) => Self::bad_request("INVALID_COLOR", err.to_string()),
        }
    }
}

impl From<PaletteError> for ApiError {
    fn from(err: PaletteError) -> Self {
        match err {
            PaletteError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "PALETTE_NOT_FOUND", err.to_string())
            }
            PaletteError::InvalidColors(color) => color.into(),
            PaletteError::Database(_) | PaletteError::Corrupt(_) => Self::internal(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailExists => Self::new(StatusCode::CONFLICT, "EMAIL_EXISTS", "Email already registered"),
            AuthError::InvalidCredentials => Self::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            ),
            AuthError::Database(_) => Self::internal(err),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match &err {
            GenerationError::InvalidInput(message) => {
                Self::bad_request("INVALID_INPUT", message.clone())
            }
            GenerationError::Provider(ProviderError::Http { .. }) => Self::new(
                StatusCode::BAD_GATEWAY,
                "STABILITY_AI_HTTP_ERROR",
                err.to_string(),
            ),
            GenerationError::Provider(ProviderError::Transport(_)) => Self::new(
                StatusCode::BAD_GATEWAY,
                "STABILITY_AI_ERROR",
                err.to_string(),
            ),
            GenerationError::Cache(_) => Self::internal(&err),
        }
    }
}
