//! Palette image generation pipeline
//!
//! 1. Build the prompt from the scene template and palette
//! 2. Derive a cache key from (prompt, size)
//! 3. Serve cache hits directly
//! 4. On a miss, call the image provider and cache the result for 12 hours

use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, ResultCache};
use crate::prompt::build_prompt;
use crate::stability::{ImageProvider, ProviderError};

/// Lifetime of a cached result (12 hours)
pub const CACHE_TTL_SECS: u64 = 43_200;

/// Namespace tag on every cache key
pub const CACHE_KEY_PREFIX: &str = "dalle:";

/// Image size used when the caller gives none
pub const DEFAULT_SIZE: &str = "512x512";

/// Generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("cache lookup failed: {0}")]
    Cache(#[from] CacheError),
}

/// A generated (or cached) image and the prompt behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub url: String,
    pub prompt: String,
}

/// Derive the cache key for a prompt at a given size
pub fn cache_key(prompt: &str, size: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hasher.update(b"_");
    hasher.update(size.as_bytes());
    format!("{}{}", CACHE_KEY_PREFIX, hex::encode(hasher.finalize()))
}

/// Orchestrates prompt building, caching and provider calls
#[derive(Clone)]
pub struct GenerationService {
    cache: Arc<dyn ResultCache>,
    provider: Arc<dyn ImageProvider>,
}

impl GenerationService {
    /// Create a service over an already-selected cache and provider
    pub fn new(cache: Arc<dyn ResultCache>, provider: Arc<dyn ImageProvider>) -> Self {
        Self { cache, provider }
    }

    /// Generate an image for a palette in a scene
    pub async fn generate<S: AsRef<str>>(
        &self,
        colors: &[S],
        scene: &str,
        size: &str,
        name: &str,
        description: &str,
    ) -> Result<GenerationResult, GenerationError> {
        if colors.is_empty() {
            return Err(GenerationError::InvalidInput(
                "Hex list cannot be empty for image generation.".to_string(),
            ));
        }

        let prompt = build_prompt(scene, colors, name, description);
        let key = cache_key(&prompt, size);

        if let Some(url) = self.cache.get(&key).await? {
            debug!("Cache hit for {}", key);
            return Ok(GenerationResult { url, prompt });
        }

        info!("Generating image for scene '{}' ({})", scene.trim(), size);
        let url = self.provider.generate(&prompt, size).await?;

        if let Err(e) = self.cache.setex(&key, CACHE_TTL_SECS, &url).await {
            warn!("Cache write failed for {}: {}", key, e);
        }

        Ok(GenerationResult { url, prompt })
    }
}
