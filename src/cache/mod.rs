use crate::models::{Itinerary, Personality, Route, TripDuration};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub mod memory;
pub mod redis;

pub use memory::MemoryItineraryCache;
pub use redis::RedisItineraryCache;

/// Storage for generated itineraries, keyed by [`itinerary_cache_key`]
#[async_trait]
pub trait ItineraryCache: Send + Sync {
    async fn get_itinerary(&self, key: &str) -> Option<Itinerary>;
    async fn cache_itinerary(&self, key: &str, itinerary: &Itinerary);
    async fn get_stats(&self) -> CacheStats;
    async fn health_check(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

/// Key for an itinerary request.
/// Stop order matters: the same places in a different order is a different trip.
pub fn itinerary_cache_key(
    route: &Route,
    personality: Personality,
    duration: TripDuration,
    preferences: &[String],
) -> String {
    let mut hasher = DefaultHasher::new();

    for id in route.ids() {
        id.hash(&mut hasher);
    }
    personality.hash(&mut hasher);
    duration.hash(&mut hasher);

    let mut prefs: Vec<String> = preferences.iter().map(|p| p.trim().to_lowercase()).collect();
    prefs.sort();
    prefs.dedup();
    prefs.hash(&mut hasher);

    format!("itinerary:{:x}", hasher.finish())
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub connected: bool,
}

impl CacheStats {
    pub(crate) fn from_counts(hits: u64, misses: u64, connected: bool) -> Self {
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            connected,
        }
    }
}
