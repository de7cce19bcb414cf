//! In-process result cache
//!
//! Entries live only as long as the process and are not shared between
//! processes. Expired entries are dropped lazily on read.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CacheError, ResultCache};

/// HashMap-backed cache: key -> (value, expires_at)
///
/// `expires_at` is `None` when the TTL reaches past what `Instant` can hold.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some((value, expires_at)) if expires_at.map_or(true, |t| t > now) => {
                    return Ok(Some(value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: evict unless a fresh write raced in
        let mut entries = self.entries.write();
        if let Some((_, Some(expires_at))) = entries.get(key) {
            if *expires_at <= now {
                entries.remove(key);
            }
        }
        Ok(None)
    }

    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> Result<(), CacheError> {
        let expires_at = Instant::now().checked_add(Duration::from_secs(ttl_secs));
        self.entries
            .write()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }
}
