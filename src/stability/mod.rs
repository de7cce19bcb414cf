//! Stability AI integration
//!
//! Provides:
//! - `ImageProvider` trait used by the generation service
//! - `StabilityClient`, a multipart client for the Stable Image endpoint
//! - `ProviderError`, separating upstream HTTP failures from transport failures

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Default Stable Image (SD3) generation endpoint
pub const DEFAULT_API_URL: &str = "https://api.stability.ai/v2beta/stable-image/generate/sd3";

/// Fixed timeout for one generation call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Output format requested from the provider
const OUTPUT_FORMAT: &str = "png";

/// Prefix of every returned image reference
pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Image provider errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Provider answered with a non-success status
    #[error("{status} - {detail}")]
    Http { status: u16, detail: String },

    /// Request never produced a usable response (connect, timeout, body read)
    #[error("An unexpected error occurred during image generation - {0}")]
    Transport(String),
}

/// Anything that can turn a prompt into an image reference
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image, returning a `data:image/png;base64,` URI
    async fn generate(&self, prompt: &str, size: &str) -> Result<String, ProviderError>;
}

/// Stability AI client
#[derive(Debug, Clone)]
pub struct StabilityClient {
    /// HTTP client
    client: Client,
    /// API key (sent as a bearer credential)
    api_key: String,
    /// Generation endpoint
    api_url: String,
}

impl StabilityClient {
    /// Create a new client for `api_url`
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_url: api_url.into(),
        })
    }

    /// Endpoint this client posts to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn form(prompt: &str) -> Form {
        // The endpoint insists on multipart even without an init image
        Form::new()
            .text("prompt", prompt.to_string())
            .text("output_format", OUTPUT_FORMAT)
            .part("none", Part::bytes(Vec::new()).file_name("none"))
    }
}

#[async_trait]
impl ImageProvider for StabilityClient {
    async fn generate(&self, prompt: &str, size: &str) -> Result<String, ProviderError> {
        // SD3 has no size field; size only distinguishes cache entries
        debug!(size, "Sending image generation request to Stability AI");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("Accept", "image/*")
            .multipart(Self::form(prompt))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Stability AI error: {} - {}", status, body);
            return Err(ProviderError::Http {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        debug!("Received {} image bytes", bytes.len());
        Ok(to_data_uri(&bytes))
    }
}

/// Wrap PNG bytes as a data URI
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("{}{}", DATA_URI_PREFIX, BASE64.encode(bytes))
}

/// Human-readable detail from an error body.
///
/// JSON bodies are searched for `errors`, then `name` + `message`, then
/// `message`. Anything else is reported as raw text.
pub fn error_detail(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if let Some(obj) = parsed.as_ref().and_then(Value::as_object) {
        if let Some(errors) = obj.get("errors").and_then(Value::as_array) {
            let joined = errors
                .iter()
                .map(|e| match e {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return format!("Details: {}", joined);
        }

        let name = obj.get("name").and_then(Value::as_str);
        let message = obj.get("message").and_then(Value::as_str);
        match (name, message) {
            (Some(name), Some(message)) => {
                return format!("Name: {}, Message: {}", name, message);
            }
            (None, Some(message)) => return format!("Details: {}", message),
            _ => {}
        }
    }

    format!("Response body: {}", body)
}
