//! In-memory caches
//!
//! These caches are volatile and cleared on restart.
//! Uses Moka for high-performance concurrent caching.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

/// Catalog response cache.
///
/// The metadata provider's responses change slowly; search results get
/// a short TTL, per-movie detail responses a long one. Keys are the
/// request shape (operation + parameters), values the raw JSON body.
pub struct CatalogCache {
    search: Cache<String, Arc<serde_json::Value>>,
    details: Cache<String, Arc<serde_json::Value>>,
}

impl CatalogCache {
    /// Create the two TTL regions.
    ///
    /// # Arguments
    /// * `max_items` - Maximum entries per region
    /// * `search_ttl` - Search response TTL in seconds
    /// * `details_ttl` - Detail response TTL in seconds
    pub fn new(max_items: u64, search_ttl: u64, details_ttl: u64) -> Self {
        let search = Cache::builder()
            .max_capacity(max_items)
            .time_to_live(Duration::from_secs(search_ttl))
            .build();
        let details = Cache::builder()
            .max_capacity(max_items)
            .time_to_live(Duration::from_secs(details_ttl))
            .build();

        Self { search, details }
    }

    pub async fn get_search(&self, key: &str) -> Option<Arc<serde_json::Value>> {
        Self::record(self.search.get(key).await, "catalog_search")
    }

    pub async fn insert_search(&self, key: String, value: serde_json::Value) {
        self.search.insert(key, Arc::new(value)).await;

        use crate::metrics::CACHE_SIZE;
        CACHE_SIZE
            .with_label_values(&["catalog_search"])
            .set(self.search.entry_count() as i64);
    }

    pub async fn get_details(&self, key: &str) -> Option<Arc<serde_json::Value>> {
        Self::record(self.details.get(key).await, "catalog_details")
    }

    pub async fn insert_details(&self, key: String, value: serde_json::Value) {
        self.details.insert(key, Arc::new(value)).await;

        use crate::metrics::CACHE_SIZE;
        CACHE_SIZE
            .with_label_values(&["catalog_details"])
            .set(self.details.entry_count() as i64);
    }

    fn record(
        result: Option<Arc<serde_json::Value>>,
        cache_name: &str,
    ) -> Option<Arc<serde_json::Value>> {
        use crate::metrics::{CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL};
        if result.is_some() {
            CACHE_HITS_TOTAL.with_label_values(&[cache_name]).inc();
        } else {
            CACHE_MISSES_TOTAL.with_label_values(&[cache_name]).inc();
        }
        result
    }
}
