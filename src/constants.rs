//! Stable application-wide constants.
//!
//! Values here are loyalty-mechanic amounts, planner limits and default
//! fallbacks for env-var-based configuration. Tunable values are surfaced
//! through [`PlannerConfig`](crate::config::PlannerConfig) and
//! [`CoinRules`](crate::config::CoinRules).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Geometry ---

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// --- Route planning ---

/// Stop cap for a day trip without an overnight stay.
pub const DEFAULT_DAY_TRIP_MAX_STOPS: usize = 3;
/// Stop cap for a two-day, one-night trip.
pub const DEFAULT_ONE_NIGHT_MAX_STOPS: usize = 6;
/// The shuffled candidate pool is this many times the stop cap.
pub const DEFAULT_CANDIDATE_POOL_MULTIPLIER: usize = 2;
/// Maximum alternatives offered when a stop has to be replaced.
pub const DEFAULT_MAX_ALTERNATIVES: usize = 5;
/// Keywords that rank a place first for introvert travellers.
pub const DEFAULT_INTROVERT_KEYWORDS: &[&str] = &["temple", "nature", "park", "sanctuary"];

// --- Coin rewards ---

/// Coins awarded per photo uploaded at a visited stop.
pub const DEFAULT_COINS_PER_PHOTO: u32 = 10;
/// One-time bonus for visiting every stop of a journey.
pub const DEFAULT_JOURNEY_COMPLETION_BONUS: u32 = 100;
/// Coins awarded for posting a place review.
pub const DEFAULT_REVIEW_BONUS: u32 = 50;

// --- Itinerary generation ---

/// Base URL of the generative language API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Models tried in order, lighter models first for availability.
pub const DEFAULT_GEMINI_MODELS: &str =
    "gemini-2.0-flash-lite,gemini-1.5-flash-8b,gemini-2.0-flash,gemini-2.5-flash";
/// Attempts per model before moving on to the next one.
pub const DEFAULT_GEMINI_MAX_RETRIES: u32 = 2;
/// Per-request timeout for the itinerary provider.
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;
/// Linear backoff step between retries of an overloaded model.
pub const GEMINI_RETRY_BACKOFF_MS: u64 = 2_000;

// --- Cache defaults ---

/// Default itinerary cache TTL: 6 hours. Overridden by `ITINERARY_CACHE_TTL`.
pub const DEFAULT_ITINERARY_CACHE_TTL_SECONDS: u64 = 21_600;
/// Maximum entries for the in-memory itinerary cache.
pub const DEFAULT_MEMORY_CACHE_MAX_ENTRIES: u64 = 1_000;

// --- Document store collections ---

pub const USERS_COLLECTION: &str = "users";
pub const JOURNEYS_COLLECTION: &str = "journeys";
pub const PLACES_COLLECTION: &str = "places";
pub const REVIEWS_COLLECTION: &str = "reviews";
pub const REDEMPTIONS_COLLECTION: &str = "redemptions";

/// Field on user documents holding the coin balance.
pub const TOTAL_COINS_FIELD: &str = "totalCoins";
