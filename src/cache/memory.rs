use crate::cache::{CacheStats, ItineraryCache};
use crate::models::Itinerary;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory itinerary cache backed by moka with TTL and bounded capacity
pub struct MemoryItineraryCache {
    itineraries: Cache<String, Arc<Itinerary>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryItineraryCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let itineraries = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MemoryItineraryCache {
            itineraries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl ItineraryCache for MemoryItineraryCache {
    async fn get_itinerary(&self, key: &str) -> Option<Itinerary> {
        match self.itineraries.get(key).await {
            Some(itinerary) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache hit for itinerary: {}", key);
                Some((*itinerary).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Memory cache miss for itinerary: {}", key);
                None
            }
        }
    }

    async fn cache_itinerary(&self, key: &str, itinerary: &Itinerary) {
        self.itineraries
            .insert(key.to_string(), Arc::new(itinerary.clone()))
            .await;
        tracing::debug!("Memory cached itinerary '{}': {}", itinerary.trip_name, key);
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            true,
        )
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_itinerary(name: &str) -> Itinerary {
        Itinerary {
            trip_name: name.to_string(),
            total_days: 1,
            personality: "default".to_string(),
            summary: String::new(),
            days: vec![],
            packing_tips: vec![],
            budget_estimate: String::new(),
            is_offline: false,
        }
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = MemoryItineraryCache::new(3600, 100);
        assert!(cache.get_itinerary("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let cache = MemoryItineraryCache::new(3600, 100);
        cache.cache_itinerary("key1", &make_itinerary("Old City Walk")).await;

        let cached = cache.get_itinerary("key1").await.unwrap();
        assert_eq!(cached.trip_name, "Old City Walk");
    }

    #[tokio::test]
    async fn test_stats_tracking() {
        let cache = MemoryItineraryCache::new(3600, 100);
        cache.cache_itinerary("key1", &make_itinerary("a")).await;

        // 1 miss
        cache.get_itinerary("missing").await;
        // 2 hits
        cache.get_itinerary("key1").await;
        cache.get_itinerary("key1").await;

        let stats = cache.get_stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 66.666).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_backend_name_is_memory() {
        let cache = MemoryItineraryCache::new(3600, 100);
        assert_eq!(cache.backend_name(), "memory");
        assert!(cache.health_check().await);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = MemoryItineraryCache::new(1, 100); // 1 second TTL
        cache.cache_itinerary("key1", &make_itinerary("a")).await;

        assert!(cache.get_itinerary("key1").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get_itinerary("key1").await.is_none());
    }
}
