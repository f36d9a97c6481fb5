use crate::constants::*;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Postgres document store; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// Redis itinerary cache; falls back to the in-memory cache when unset
    pub redis_url: Option<String>,
    pub itinerary_cache_ttl: u64,
    pub itinerary: ItineraryConfig,
    pub planner: PlannerConfig,
    pub coins: CoinRules,
}

#[derive(Debug, Clone)]
pub struct ItineraryConfig {
    /// Without a key every itinerary is generated offline
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    /// Models tried in order until one answers
    pub gemini_models: Vec<String>,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for ItineraryConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_models: split_list(DEFAULT_GEMINI_MODELS),
            max_retries: DEFAULT_GEMINI_MAX_RETRIES,
            timeout_secs: DEFAULT_GEMINI_TIMEOUT_SECS,
        }
    }
}

impl ItineraryConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let gemini_models = env::var("GEMINI_MODELS")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.gemini_models);
        if gemini_models.is_empty() {
            return Err("GEMINI_MODELS must name at least one model".to_string());
        }

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            gemini_models,
            max_retries: parse_env("GEMINI_MAX_RETRIES", defaults.max_retries)?,
            timeout_secs: parse_env("GEMINI_TIMEOUT_SECS", defaults.timeout_secs)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Stop cap for "1 day, no overnight" trips
    pub day_trip_max_stops: usize,

    /// Stop cap for "2 days, 1 night" trips
    pub one_night_max_stops: usize,

    /// Size of the shuffled candidate pool as a multiple of the stop cap.
    /// With a cap of 3 and multiplier 2 the final stops are drawn from the top 6.
    pub candidate_pool_multiplier: usize,

    /// Number of alternatives offered by an emergency replan
    pub max_alternatives: usize,

    /// Lowercase keywords that rank a place first for introvert travellers
    pub introvert_keywords: Vec<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            day_trip_max_stops: DEFAULT_DAY_TRIP_MAX_STOPS,
            one_night_max_stops: DEFAULT_ONE_NIGHT_MAX_STOPS,
            candidate_pool_multiplier: DEFAULT_CANDIDATE_POOL_MULTIPLIER,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            introvert_keywords: DEFAULT_INTROVERT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            day_trip_max_stops: parse_env("PLANNER_DAY_TRIP_MAX_STOPS", defaults.day_trip_max_stops)?,
            one_night_max_stops: parse_env(
                "PLANNER_ONE_NIGHT_MAX_STOPS",
                defaults.one_night_max_stops,
            )?,
            candidate_pool_multiplier: parse_env(
                "PLANNER_CANDIDATE_POOL_MULTIPLIER",
                defaults.candidate_pool_multiplier,
            )?,
            max_alternatives: parse_env("PLANNER_MAX_ALTERNATIVES", defaults.max_alternatives)?,
            introvert_keywords: env::var("PLANNER_INTROVERT_KEYWORDS")
                .map(|v| split_list(&v.to_lowercase()))
                .unwrap_or(defaults.introvert_keywords),
        };

        if config.day_trip_max_stops == 0 || config.one_night_max_stops == 0 {
            return Err("Planner stop caps must be at least 1".to_string());
        }
        if config.candidate_pool_multiplier == 0 {
            return Err("PLANNER_CANDIDATE_POOL_MULTIPLIER must be at least 1".to_string());
        }

        Ok(config)
    }
}

/// Coin amounts of the loyalty mechanic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoinRules {
    pub coins_per_photo: u32,
    pub completion_bonus: u32,
    pub review_bonus: u32,
}

impl Default for CoinRules {
    fn default() -> Self {
        Self {
            coins_per_photo: DEFAULT_COINS_PER_PHOTO,
            completion_bonus: DEFAULT_JOURNEY_COMPLETION_BONUS,
            review_bonus: DEFAULT_REVIEW_BONUS,
        }
    }
}

impl CoinRules {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        Ok(Self {
            coins_per_photo: parse_env("COINS_PER_PHOTO", defaults.coins_per_photo)?,
            completion_bonus: parse_env("COINS_COMPLETION_BONUS", defaults.completion_bonus)?,
            review_bonus: parse_env("COINS_REVIEW_BONUS", defaults.review_bonus)?,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            database_url: env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
            redis_url: env::var("REDIS_URL").ok().filter(|u| !u.is_empty()),
            itinerary_cache_ttl: parse_env(
                "ITINERARY_CACHE_TTL",
                DEFAULT_ITINERARY_CACHE_TTL_SECONDS,
            )?,
            itinerary: ItineraryConfig::from_env()?,
            planner: PlannerConfig::from_env()?,
            coins: CoinRules::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| format!("Invalid {}", key)),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
