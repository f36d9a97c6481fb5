use crate::cache::{CacheStats, ItineraryCache};
use crate::error::{AppError, Result};
use crate::models::Itinerary;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bumped whenever the stored itinerary shape changes, so old entries are
/// simply never read again and expire on their own.
const KEY_NAMESPACE: &str = "lonq:v1:";

fn namespaced(key: &str) -> String {
    format!("{}{}", KEY_NAMESPACE, key)
}

/// Itineraries shared between instances through Redis.
///
/// Hit and miss counts are this instance's own; the server's keyspace
/// counters include every other client of the same Redis.
pub struct RedisItineraryCache {
    connection: ConnectionManager,
    ttl_seconds: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RedisItineraryCache {
    pub async fn new(redis_url: &str, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Cache(format!("Invalid Redis URL: {}", e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Cache(format!("Redis unreachable: {}", e)))?;

        tracing::info!("Itinerary cache on Redis, entries live {}s", ttl_seconds);
        Ok(RedisItineraryCache {
            connection,
            ttl_seconds,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    fn miss(&self) -> Option<Itinerary> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Entries that no longer decode are removed so the next request
    /// regenerates them instead of failing on every read until expiry
    async fn evict(&self, redis_key: &str) {
        let mut conn = self.connection.clone();
        if let Err(e) = conn.del::<_, ()>(redis_key).await {
            tracing::warn!("Could not evict undecodable itinerary {}: {}", redis_key, e);
        }
    }
}

#[async_trait]
impl ItineraryCache for RedisItineraryCache {
    async fn get_itinerary(&self, key: &str) -> Option<Itinerary> {
        let redis_key = namespaced(key);
        let mut conn = self.connection.clone();

        let payload: Option<String> = match conn.get(&redis_key).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Redis read failed for {}: {}", redis_key, e);
                return self.miss();
            }
        };

        let Some(payload) = payload else {
            return self.miss();
        };

        match serde_json::from_str::<Itinerary>(&payload) {
            Ok(itinerary) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Redis itinerary hit: {}", redis_key);
                Some(itinerary)
            }
            Err(e) => {
                tracing::warn!("Dropping undecodable itinerary {}: {}", redis_key, e);
                self.evict(&redis_key).await;
                self.miss()
            }
        }
    }

    async fn cache_itinerary(&self, key: &str, itinerary: &Itinerary) {
        let payload = match serde_json::to_string(itinerary) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Itinerary '{}' not cached: {}", itinerary.trip_name, e);
                return;
            }
        };

        let redis_key = namespaced(key);
        let mut conn = self.connection.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(&redis_key, payload, self.ttl_seconds)
            .await
        {
            tracing::warn!("Redis write failed for {}: {}", redis_key, e);
        }
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.health_check().await,
        )
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
