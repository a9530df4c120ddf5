//! In-memory cache for extracted records.
//!
//! [`CachedExtractor`] wraps any [`Extractor`] and remembers successful
//! records keyed by the normalised (name, state, district) triple. Uses
//! [`moka`] for async-friendly caching with TTL and automatic eviction.
//! Failures are never cached, so a later batch asks the service again.

use std::time::Duration;

use moka::future::Cache;

use crate::engine::Extractor;
use crate::error::SearchError;
use crate::types::{CollegeRecord, SearchItem};

/// Maximum number of cached records.
const MAX_CACHE_ENTRIES: u64 = 1_000;

/// Cache key: lowercased, whitespace-collapsed item fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    state: String,
    district: String,
}

impl CacheKey {
    /// Build a deterministic key for `item`. The id is ignored.
    pub fn new(item: &SearchItem) -> Self {
        Self {
            name: normalise(&item.name),
            state: normalise(&item.state),
            district: normalise(item.district_or_empty()),
        }
    }
}

fn normalise(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// An [`Extractor`] that serves repeated items from memory.
pub struct CachedExtractor<E> {
    inner: E,
    cache: Option<Cache<CacheKey, CollegeRecord>>,
}

impl<E: Extractor> CachedExtractor<E> {
    /// Wrap `inner` with a cache whose entries live for `ttl_seconds`.
    ///
    /// A TTL of 0 disables caching; every call goes to `inner`.
    pub fn new(inner: E, ttl_seconds: u64) -> Self {
        let cache = (ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build()
        });
        Self { inner, cache }
    }

    /// The wrapped extractor.
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Extractor> Extractor for CachedExtractor<E> {
    async fn extract(&self, item: &SearchItem) -> Result<CollegeRecord, SearchError> {
        let Some(cache) = &self.cache else {
            return self.inner.extract(item).await;
        };

        let key = CacheKey::new(item);
        if let Some(record) = cache.get(&key).await {
            tracing::debug!(name = %item.name, "record served from cache");
            return Ok(record);
        }

        let record = self.inner.extract(item).await?;
        cache.insert(key, record.clone()).await;
        Ok(record)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
