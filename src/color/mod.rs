//! Hex color validation
//!
//! Palette colors are `#RRGGBB` strings. Hex digits may be upper or lower
//! case; the leading `#` is mandatory.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Validation errors for palette colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// The color list is empty
    Empty,
    /// A color does not match `#RRGGBB`
    InvalidFormat(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::Empty => write!(f, "Color list must contain at least one color"),
            ColorError::InvalidFormat(color) => {
                write!(f, "Invalid color '{}': expected #RRGGBB", color)
            }
        }
    }
}

impl std::error::Error for ColorError {}

static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// Check a single color string
pub fn is_hex_color(color: &str) -> bool {
    HEX_COLOR_REGEX.is_match(color)
}

/// Validate a palette's color list.
///
/// Returns the first offending color on failure.
pub fn validate_colors<S: AsRef<str>>(colors: &[S]) -> Result<(), ColorError> {
    if colors.is_empty() {
        return Err(ColorError::Empty);
    }

    match colors.iter().find(|c| !is_hex_color(c.as_ref())) {
        Some(bad) => Err(ColorError::InvalidFormat(bad.as_ref().to_string())),
        None => Ok(()),
    }
}
