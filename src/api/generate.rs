//! Image generation endpoint
//!
//! POST /api/dalle/generate
//!
//! Palette by reference:
//!     { "palette_id": 1, "context": "ppt", "size": "512x512" }
//!
//! Palette inline:
//!     { "hex_list": ["#0E2148", "#483AA0"], "context": "ppt", "size": "512x512",
//!       "palette_name": "Ocean Breeze", "palette_description": "Cool and calm" }
//!
//! Success: { "url": "data:image/png;base64,...", "prompt": "...", "palette_id": 1 }

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::ApiError;
use super::AppState;
use crate::color::validate_colors;
use crate::generation::DEFAULT_SIZE;
use crate::palettes::PaletteError;

/// Name used for inline palettes without one
const INLINE_PALETTE_NAME: &str = "Custom Palette";

/// Name used for stored palettes with an empty name
const UNNAMED_PALETTE_NAME: &str = "Unnamed Palette";

/// Build the generation router
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dalle/generate", post(generate))
}

/// Where the palette comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteSource {
    /// Stored palette, looked up by id
    Stored(i64),
    /// Palette sent in the request body
    Inline {
        hex_list: Vec<String>,
        name: String,
        description: String,
    },
}

/// A validated generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub source: PaletteSource,
    pub context: String,
    pub size: String,
}

/// Generation response
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub url: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette_id: Option<i64>,
}

fn field<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|v| !v.is_null())
}

fn optional_string(
    body: &Map<String, Value>,
    name: &str,
    default: &str,
) -> Result<String, ApiError> {
    match field(body, name) {
        None => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ApiError::bad_request(
            "INVALID_PARAM",
            format!("'{}' must be a string.", name),
        )),
    }
}

fn missing_palette() -> ApiError {
    ApiError::bad_request("PARAM_MISSING", "'palette_id' or 'hex_list' is required.")
}

fn parse_palette_id(value: &Value) -> Result<i64, ApiError> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.ok_or_else(|| ApiError::bad_request("INVALID_PARAM", "'palette_id' must be an integer."))
}

fn parse_hex_list(value: &Value) -> Result<Vec<String>, ApiError> {
    let invalid = || ApiError::bad_request("INVALID_PARAM", "'hex_list' must be a list of strings.");
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

impl GenerateRequest {
    /// Validate a raw request body
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::invalid_json())?;
        let body = match value {
            Value::Object(map) if !map.is_empty() => map,
            _ => return Err(ApiError::invalid_json()),
        };

        let palette_id = match field(&body, "palette_id") {
            Some(value) => Some(parse_palette_id(value)?),
            None => None,
        };
        let hex_list = field(&body, "hex_list");
        if palette_id.is_none() && hex_list.is_none() {
            return Err(missing_palette());
        }

        let context = match field(&body, "context") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(ApiError::bad_request(
                    "PARAM_MISSING",
                    "'context' (string) is required.",
                ))
            }
        };
        let size = optional_string(&body, "size", DEFAULT_SIZE)?;

        let source = match (palette_id, hex_list) {
            (Some(id), _) => PaletteSource::Stored(id),
            (None, Some(value)) => {
                let hex_list = parse_hex_list(value)?;
                validate_colors(&hex_list)?;
                PaletteSource::Inline {
                    hex_list,
                    name: optional_string(&body, "palette_name", INLINE_PALETTE_NAME)?,
                    description: optional_string(&body, "palette_description", "")?,
                }
            }
            (None, None) => return Err(missing_palette()),
        };

        Ok(Self {
            source,
            context,
            size,
        })
    }
}

/// Generate an image for a stored or inline palette
async fn generate(State(state): State<AppState>, body: Bytes) -> Result<Json<GenerateResponse>, ApiError> {
    let request = GenerateRequest::parse(&body)?;

    let (palette_id, hex_list, name, description) = match request.source {
        PaletteSource::Stored(id) => {
            let palette = state
                .palettes
                .get(id)
                .await?
                .ok_or(PaletteError::NotFound(id))?;
            if palette.hex_list.is_empty() {
                return Err(ApiError::bad_request(
                    "PALETTE_NO_COLORS",
                    format!("Palette with id {} has no colors defined.", id),
                ));
            }
            let name = if palette.name.is_empty() {
                UNNAMED_PALETTE_NAME.to_string()
            } else {
                palette.name
            };
            (
                Some(id),
                palette.hex_list,
                name,
                palette.description.unwrap_or_default(),
            )
        }
        PaletteSource::Inline {
            hex_list,
            name,
            description,
        } => (None, hex_list, name, description),
    };

    debug!(
        "Generate request: context='{}' size={} colors={}",
        request.context,
        request.size,
        hex_list.len()
    );

    let result = state
        .generator
        .generate(&hex_list, &request.context, &request.size, &name, &description)
        .await?;

    Ok(Json(GenerateResponse {
        url: result.url,
        prompt: result.prompt,
        palette_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<GenerateRequest, ApiError> {
        GenerateRequest::parse(body.as_bytes())
    }

    fn code(body: &str) -> &'static str {
        parse(body).unwrap_err().code
    }

    #[test]
    fn test_stored_palette_request() {
        let req = parse(r#"{"palette_id": 3, "context": "ppt"}"#).unwrap();
        assert_eq!(req.source, PaletteSource::Stored(3));
        assert_eq!(req.context, "ppt");
        assert_eq!(req.size, "512x512");
    }

    #[test]
    fn test_palette_id_as_string() {
        let req = parse(r#"{"palette_id": "12", "context": "ppt", "size": "1024x1024"}"#).unwrap();
        assert_eq!(req.source, PaletteSource::Stored(12));
        assert_eq!(req.size, "1024x1024");
    }

    #[test]
    fn test_inline_palette_defaults() {
        let req = parse(r##"{"hex_list": ["#FF0000", "#00ff00"], "context": "geometric"}"##).unwrap();
        assert_eq!(
            req.source,
            PaletteSource::Inline {
                hex_list: vec!["#FF0000".to_string(), "#00ff00".to_string()],
                name: "Custom Palette".to_string(),
                description: String::new(),
            }
        );
    }

    #[test]
    fn test_invalid_json() {
        assert_eq!(code("not json"), "INVALID_JSON");
        assert_eq!(code("{}"), "INVALID_JSON");
        assert_eq!(code("[1, 2]"), "INVALID_JSON");
        assert_eq!(code(""), "INVALID_JSON");
    }

    #[test]
    fn test_missing_params() {
        assert_eq!(code(r#"{"context": "ppt"}"#), "PARAM_MISSING");
        assert_eq!(code(r#"{"palette_id": null, "context": "ppt"}"#), "PARAM_MISSING");
        assert_eq!(code(r#"{"palette_id": 1}"#), "PARAM_MISSING");
        assert_eq!(code(r##"{"hex_list": ["#FF0000"], "context": ""}"##), "PARAM_MISSING");
        assert_eq!(code(r#"{"palette_id": 1, "context": 5}"#), "PARAM_MISSING");
    }

    #[test]
    fn test_invalid_params() {
        assert_eq!(code(r#"{"palette_id": "abc", "context": "ppt"}"#), "INVALID_PARAM");
        assert_eq!(code(r#"{"palette_id": 1.5, "context": "ppt"}"#), "INVALID_PARAM");
        assert_eq!(code(r#"{"palette_id": 1, "context": "ppt", "size": 512}"#), "INVALID_PARAM");
        assert_eq!(code(r##"{"hex_list": "#FF0000", "context": "ppt"}"##), "INVALID_PARAM");
        assert_eq!(code(r#"{"hex_list": [1, 2], "context": "ppt"}"#), "INVALID_PARAM");
    }

    #[test]
    fn test_color_validation() {
        assert_eq!(code(r#"{"hex_list": [], "context": "ppt"}"#), "EMPTY_COLORS");
        assert_eq!(code(r##"{"hex_list": ["#ZZZZZZ"], "context": "ppt"}"##), "INVALID_COLOR");
        assert_eq!(code(r#"{"hex_list": ["123456"], "context": "ppt"}"#), "INVALID_COLOR");
        assert_eq!(code(r#"{"hex_list": ["invalid"], "context": "ppt"}"#), "INVALID_COLOR");
        assert!(parse(r##"{"hex_list": ["#FF5733"], "context": "ppt"}"##).is_ok());
    }

    #[test]
    fn test_palette_id_wins_over_hex_list() {
        let req = parse(r##"{"palette_id": 2, "hex_list": ["#FF5733"], "context": "ppt"}"##).unwrap();
        assert_eq!(req.source, PaletteSource::Stored(2));
    }
}
