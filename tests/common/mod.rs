use async_trait::async_trait;
use lonq::config::{CoinRules, Config, ItineraryConfig, PlannerConfig};
use lonq::models::{Coordinates, Place};
use lonq::store::{Credit, Debit, DocumentStore, MemoryDocumentStore};
use lonq::{AppError, AppState, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Create a test place
#[allow(dead_code)]
pub fn place(id: &str, lat: f64, lng: f64) -> Place {
    Place::new(id, format!("Place {}", id), Coordinates { lat, lng })
}

/// Create a rated test place
#[allow(dead_code)]
pub fn rated_place(id: &str, rating: f32, lat: f64, lng: f64) -> Place {
    place(id, lat, lng).with_rating(rating)
}

/// Ten places spread along a line north of Chiang Mai old city
#[allow(dead_code)]
pub fn ten_places() -> Vec<Place> {
    (1..=10)
        .map(|i| rated_place(&i.to_string(), 5.0 - i as f32 * 0.1, 18.78 + i as f64 * 0.01, 98.98))
        .collect()
}

/// Get test configuration
#[allow(dead_code)]
pub fn get_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        database_url: None,
        redis_url: None,
        itinerary_cache_ttl: 3600,
        itinerary: ItineraryConfig::default(),
        planner: PlannerConfig::default(),
        coins: CoinRules::default(),
    }
}

/// In-memory app state with no itinerary provider and a seeded planner
#[allow(dead_code)]
pub fn setup_test_state() -> AppState {
    setup_test_state_with_store(Arc::new(MemoryDocumentStore::new()))
}

/// Same as [`setup_test_state`] over the given store
#[allow(dead_code)]
pub fn setup_test_state_with_store(store: Arc<dyn DocumentStore>) -> AppState {
    let mut state = AppState::new(&get_test_config(), store, None, None);
    state.journeys = state.journeys.with_rng_seed(42);
    state
}

/// In-memory store whose balance writes fail while an outage is on.
/// Reads and plain document writes keep working.
#[allow(dead_code)]
#[derive(Default)]
pub struct FlakyBalanceStore {
    inner: MemoryDocumentStore,
    outage: AtomicBool,
}

#[allow(dead_code)]
impl FlakyBalanceStore {
    pub fn set_outage(&self, on: bool) {
        self.outage.store(on, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(AppError::Store("unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyBalanceStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        self.inner.set(collection, id, document).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        self.inner.update(collection, id, fields).await
    }

    async fn add(&self, collection: &str, document: Value) -> Result<String> {
        self.inner.add(collection, document).await
    }

    async fn query(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        self.inner.query(collection, field, value).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        self.inner.list(collection).await
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64> {
        self.check()?;
        self.inner.increment(collection, id, field, delta).await
    }

    async fn debit_and_put(
        &self,
        debit: Debit,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64> {
        self.check()?;
        self.inner.debit_and_put(debit, collection, id, document).await
    }

    async fn credit_and_put(
        &self,
        credit: Credit,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64> {
        self.check()?;
        self.inner.credit_and_put(credit, collection, id, document).await
    }

    async fn health_check(&self) -> bool {
        !self.outage.load(Ordering::SeqCst)
    }

    fn backend_name(&self) -> &'static str {
        "flaky-memory"
    }
}

/// Create a user with the given liked places and balance
#[allow(dead_code)]
pub async fn create_user(state: &AppState, user_id: &str, liked: &[&str], coins: i64) {
    state
        .users
        .sync_user(user_id, "Test User", None)
        .await
        .expect("Failed to create user");
    state
        .users
        .set_liked(user_id, liked.iter().map(|id| (*id).into()).collect())
        .await
        .expect("Failed to set liked places");
    if coins != 0 {
        state
            .users
            .add_coins(user_id, coins)
            .await
            .expect("Failed to add coins");
    }
}

/// Check if we should skip real API tests
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok() || std::env::var("GEMINI_API_KEY").is_err()
}
