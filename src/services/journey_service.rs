use crate::config::{CoinRules, PlannerConfig};
use crate::constants::JOURNEYS_COLLECTION;
use crate::error::{AppError, Result};
use crate::models::{Journey, Personality, Place, PlaceId, TripDuration, VisitOutcome};
use crate::planner::{compose_route, emergency_alternatives, EmergencyPlan};
use crate::services::catalog::CatalogService;
use crate::services::user_service::UserService;
use crate::store::records::parse_journey;
use crate::store::DocumentStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type LockTable = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Held for the duration of one journey mutation
struct UserLock<'a> {
    table: &'a LockTable,
    user_id: String,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for UserLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        if let Ok(mut locks) = self.table.lock() {
            // One reference in the table and ours: nobody else is waiting
            if Arc::strong_count(&self.lock) == 2 {
                locks.remove(&self.user_id);
            }
        }
    }
}

/// Each user's current journey: planning, progress and coin credits.
///
/// A user has at most one journey, stored under their id. Mutations for the
/// same user are serialized so a visit cannot be credited twice.
pub struct JourneyService {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<CatalogService>,
    users: Arc<UserService>,
    planner: PlannerConfig,
    coins: CoinRules,
    rng: Mutex<StdRng>,
    user_locks: LockTable,
}

impl JourneyService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<CatalogService>,
        users: Arc<UserService>,
        planner: PlannerConfig,
        coins: CoinRules,
    ) -> Self {
        JourneyService {
            store,
            catalog,
            users,
            planner,
            coins,
            rng: Mutex::new(StdRng::from_rng(&mut rand::rng())),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Deterministic route selection, for tests
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Wait for exclusive access to one user's journey. The table entry is
    /// dropped with the last guard that refers to it.
    async fn lock_user(&self, user_id: &str) -> Result<UserLock<'_>> {
        let lock = {
            let mut locks = self
                .user_locks
                .lock()
                .map_err(|_| AppError::Internal("journey lock table poisoned".to_string()))?;
            locks.entry(user_id.to_string()).or_default().clone()
        };
        // Built before waiting so a cancelled wait still clears the entry
        let mut held = UserLock {
            table: &self.user_locks,
            user_id: user_id.to_string(),
            lock,
            guard: None,
        };
        held.guard = Some(held.lock.clone().lock_owned().await);
        Ok(held)
    }

    #[cfg(test)]
    fn locked_users(&self) -> usize {
        self.user_locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    pub async fn current(&self, user_id: &str) -> Result<Option<Journey>> {
        match self.store.get(JOURNEYS_COLLECTION, user_id).await? {
            Some(document) => Ok(Some(parse_journey(document)?)),
            None => Ok(None),
        }
    }

    async fn require_current(&self, user_id: &str) -> Result<Journey> {
        self.current(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' has no journey", user_id)))
    }

    async fn save(&self, user_id: &str, journey: &Journey) -> Result<()> {
        self.store
            .set(JOURNEYS_COLLECTION, user_id, serde_json::to_value(journey)?)
            .await
    }

    async fn compose(
        &self,
        user_id: &str,
        personality: Personality,
        duration: TripDuration,
    ) -> Result<Journey> {
        let liked = self.users.liked_places(user_id).await?;
        let candidates = self.catalog.resolve(&liked).await?;

        let route = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| AppError::Internal("planner rng poisoned".to_string()))?;
            compose_route(&candidates, personality, duration, &self.planner, &mut *rng)
        };

        Ok(Journey::new(route, personality, duration))
    }

    /// Resume the current journey when it was planned with the same
    /// personality and duration, otherwise plan a new one from the user's
    /// liked places
    pub async fn start(
        &self,
        user_id: &str,
        personality: Personality,
        duration: TripDuration,
    ) -> Result<Journey> {
        let _lock = self.lock_user(user_id).await?;

        if let Some(existing) = self.current(user_id).await? {
            if existing.personality == personality && existing.duration == duration {
                tracing::debug!("Resuming journey {} for user {}", existing.id, user_id);
                return Ok(existing);
            }
        }

        let journey = self.compose(user_id, personality, duration).await?;
        self.save(user_id, &journey).await?;
        tracing::info!(
            "Started journey {} for user {} with {} stops",
            journey.id,
            user_id,
            journey.stops.len()
        );
        Ok(journey)
    }

    /// Replace the current journey with a freshly randomized one. Progress on
    /// the old journey is discarded. Settings default to the current journey's.
    pub async fn regenerate(
        &self,
        user_id: &str,
        personality: Option<Personality>,
        duration: Option<TripDuration>,
    ) -> Result<Journey> {
        let _lock = self.lock_user(user_id).await?;

        let previous = self.current(user_id).await?;
        let personality = personality
            .or(previous.as_ref().map(|j| j.personality))
            .unwrap_or_default();
        let duration = duration
            .or(previous.as_ref().map(|j| j.duration))
            .unwrap_or_default();

        let journey = self.compose(user_id, personality, duration).await?;
        self.save(user_id, &journey).await?;
        tracing::info!(
            "Regenerated journey for user {}: {} stops (was {:?})",
            user_id,
            journey.stops.len(),
            previous.map(|j| j.id)
        );
        Ok(journey)
    }

    /// Record a photographed visit and credit the coins it earned. The
    /// journey and the balance are written together or not at all.
    pub async fn visit(
        &self,
        user_id: &str,
        place_id: &PlaceId,
        photos: Vec<String>,
    ) -> Result<VisitOutcome> {
        let _lock = self.lock_user(user_id).await?;

        let mut journey = self.require_current(user_id).await?;
        let outcome = journey.visit(place_id, photos, &self.coins)?;

        if outcome.coins_earned == 0 {
            return Ok(outcome);
        }

        self.users
            .credit_and_record(
                user_id,
                i64::from(outcome.coins_earned),
                JOURNEYS_COLLECTION,
                user_id,
                serde_json::to_value(&journey)?,
            )
            .await?;

        if outcome.journey_completed && outcome.completion_bonus > 0 {
            tracing::info!("User {} completed journey {}", user_id, journey.id);
        }
        Ok(outcome)
    }

    /// Next stop to replace and the places offered instead, or `None` for an
    /// empty journey
    pub async fn emergency_plan(&self, user_id: &str) -> Result<Option<EmergencyPlan>> {
        let journey = self.require_current(user_id).await?;
        let liked_ids = self.users.liked_places(user_id).await?;
        let liked = self.catalog.resolve(&liked_ids).await?;

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("planner rng poisoned".to_string()))?;
        Ok(emergency_alternatives(
            &journey.route(),
            &journey.visited_ids(),
            &liked,
            &self.planner,
            &mut *rng,
        ))
    }

    /// Swap `target` for a catalog place, keeping progress on other stops
    pub async fn substitute(
        &self,
        user_id: &str,
        target: &PlaceId,
        replacement: &PlaceId,
    ) -> Result<Journey> {
        let _lock = self.lock_user(user_id).await?;

        let replacement: Place = self.catalog.find(replacement).await?;
        let mut journey = self.require_current(user_id).await?;
        journey.substitute_stop(target, replacement)?;
        self.save(user_id, &journey).await?;

        tracing::info!("User {} replaced stop {} in journey {}", user_id, target, journey.id);
        Ok(journey)
    }
}
