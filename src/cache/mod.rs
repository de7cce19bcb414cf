//! Generation result cache
//!
//! Provides:
//! - `ResultCache` trait (`get` / `setex`)
//! - Redis-backed cache for shared deployments
//! - In-process fallback cache
//!
//! The backend is chosen once at startup by [`connect`] and handed to the
//! generation service.

mod memory;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

pub use memory::MemoryCache;
pub use remote::RedisCache;

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Key/value store with per-entry expiry
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Fetch a value, `None` on miss or expiry
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires `ttl_secs` seconds from now
    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> Result<(), CacheError>;
}

/// Select the cache backend for this process.
///
/// With a Redis URL, a connection is attempted immediately; any failure
/// falls back to the in-process cache.
pub async fn connect(redis_url: Option<&str>) -> Arc<dyn ResultCache> {
    match redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => {
                info!("Using Redis result cache");
                Arc::new(cache)
            }
            Err(e) => {
                warn!(
                    "Redis connection failed: {}. Falling back to in-memory cache.",
                    e
                );
                Arc::new(MemoryCache::new())
            }
        },
        None => {
            info!("REDIS_URL not set, using in-memory result cache");
            Arc::new(MemoryCache::new())
        }
    }
}
