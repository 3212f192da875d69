mod key;

pub use key::CacheKey;

use moka::future::Cache;
use std::time::Duration;

use crate::config::CacheConfig;

/// Memo of successful translations, bounded by entry count.
#[derive(Clone)]
pub struct TranslationCache {
    cache: Cache<String, String>,
}

impl TranslationCache {
    /// Create a cache from configuration, `None` when caching is disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.max_entries, config.ttl_seconds))
    }

    pub fn new(max_entries: u64, ttl_seconds: u64) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries);

        if ttl_seconds > 0 {
            builder = builder.time_to_live(Duration::from_secs(ttl_seconds));
        }

        Self {
            cache: builder.build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        self.cache.get(key.as_str()).await
    }

    pub async fn insert(&self, key: &CacheKey, translation: String) {
        self.cache.insert(key.to_string(), translation).await;
    }
}
