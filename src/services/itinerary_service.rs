use crate::cache::{itinerary_cache_key, ItineraryCache};
use crate::config::ItineraryConfig;
use crate::constants::GEMINI_RETRY_BACKOFF_MS;
use crate::error::AppError;
use crate::models::{Activity, ActivityType, DayItinerary, Itinerary, Personality, Route, TripDuration};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DAY_TITLES: [&str; 3] = ["Adventure Begins 🌅", "Discover Hidden Gems 🌿", "Northern Charm 🏔️"];
const OFFLINE_TRIP_NAME: &str = "🌿 Your Chiang Mai Adventure";
const FIRST_ACTIVITY_HOUR: usize = 9;
const HOURS_BETWEEN_ACTIVITIES: usize = 3;

/// Everything a provider needs to write an itinerary for an already planned route
#[derive(Debug, Clone, Copy)]
pub struct ItineraryRequest<'a> {
    pub route: &'a Route,
    pub personality: Personality,
    pub duration: TripDuration,
    pub preferences: &'a [String],
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transient: the same model may answer after a short wait
    #[error("Model overloaded: {0}")]
    Overloaded(String),

    #[error("{0}")]
    Failed(String),
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::Itinerary(e.to_string())
    }
}

/// Remote generator of narrative itineraries
#[async_trait]
pub trait ItineraryProvider: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        request: &ItineraryRequest<'_>,
    ) -> Result<Itinerary, ProviderError>;

    /// Models to try, in order of preference
    fn models(&self) -> &[String];

    fn name(&self) -> &'static str;
}

/// Produces an itinerary for every request: cached, generated, or built
/// offline from the route when the provider is missing or failing
pub struct ItineraryService {
    provider: Option<Arc<dyn ItineraryProvider>>,
    cache: Option<Arc<dyn ItineraryCache>>,
    max_retries: u32,
    backoff: Duration,
}

impl ItineraryService {
    pub fn new(
        provider: Option<Arc<dyn ItineraryProvider>>,
        cache: Option<Arc<dyn ItineraryCache>>,
        config: &ItineraryConfig,
    ) -> Self {
        ItineraryService {
            provider,
            cache,
            max_retries: config.max_retries.max(1),
            backoff: Duration::from_millis(GEMINI_RETRY_BACKOFF_MS),
        }
    }

    /// Base delay between retries of an overloaded model; attempt `n` waits `n * backoff`
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn cache(&self) -> Option<&Arc<dyn ItineraryCache>> {
        self.cache.as_ref()
    }

    pub fn is_online(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate(
        &self,
        route: &Route,
        personality: Personality,
        duration: TripDuration,
        preferences: &[String],
    ) -> Itinerary {
        let Some(provider) = self.provider.as_ref().filter(|_| !route.is_empty()) else {
            return offline_itinerary(route, personality, duration);
        };

        let key = itinerary_cache_key(route, personality, duration, preferences);
        if let Some(cache) = &self.cache {
            if let Some(itinerary) = cache.get_itinerary(&key).await {
                return itinerary;
            }
        }

        let request = ItineraryRequest {
            route,
            personality,
            duration,
            preferences,
        };

        match self.generate_with_fallbacks(provider.as_ref(), &request).await {
            Ok(itinerary) => {
                if let Some(cache) = &self.cache {
                    cache.cache_itinerary(&key, &itinerary).await;
                }
                itinerary
            }
            Err(e) => {
                tracing::warn!("All itinerary models failed, using offline itinerary: {}", e);
                offline_itinerary(route, personality, duration)
            }
        }
    }

    /// Try each model in turn. An overloaded model is retried with linear
    /// backoff; any other failure moves on to the next model.
    async fn generate_with_fallbacks(
        &self,
        provider: &dyn ItineraryProvider,
        request: &ItineraryRequest<'_>,
    ) -> Result<Itinerary, ProviderError> {
        let mut last_error = ProviderError::Failed("No models configured".to_string());

        for model in provider.models() {
            for attempt in 1..=self.max_retries {
                match provider.generate(model, request).await {
                    Ok(itinerary) => {
                        tracing::info!(
                            "{} itinerary from {} ({} activities, attempt {})",
                            provider.name(),
                            model,
                            itinerary.activity_count(),
                            attempt
                        );
                        return Ok(itinerary);
                    }
                    Err(ProviderError::Overloaded(msg)) if attempt < self.max_retries => {
                        let wait = self.backoff * attempt;
                        tracing::warn!(
                            "Attempt {} with {} overloaded, retrying in {:?}: {}",
                            attempt,
                            model,
                            wait,
                            msg
                        );
                        tokio::time::sleep(wait).await;
                    }
                    Err(e) => {
                        tracing::warn!("Attempt {} with {} failed: {}", attempt, model, e);
                        last_error = e;
                        break;
                    }
                }
            }
        }

        Err(last_error)
    }
}

fn tip_for(place: &crate::models::Place) -> &'static str {
    if place.has_tag("Culture") {
        "Dress modestly for temples"
    } else if place.has_tag("Green") {
        "Bring water and sunscreen"
    } else {
        "Visit early to avoid crowds"
    }
}

fn packing_tips(personality: Personality) -> Vec<String> {
    let tips: [&str; 3] = match personality {
        Personality::Introvert => [
            "Visit early morning to avoid crowds",
            "Bring headphones for relaxing music",
            "Find quiet spots to recharge",
        ],
        Personality::Extrovert => [
            "Chat with locals for insider tips",
            "Share your experiences with friends",
            "Try multiple local food spots",
        ],
        Personality::Adventure => [
            "Wear comfortable walking shoes",
            "Bring water and snacks",
            "Start early to beat the heat",
        ],
        Personality::Default => [
            "Bring sunscreen and a hat",
            "Carry umbrella or rain jacket",
            "Charge your phone fully",
        ],
    };
    tips.iter().map(|t| t.to_string()).collect()
}

fn budget_estimate(days: usize) -> &'static str {
    match days {
        1 => "~500-1,500 THB/person",
        2 => "~2,000-4,000 THB/person (incl. stay)",
        _ => "~3,500-6,000 THB/person (incl. stay)",
    }
}

/// Template itinerary built only from the route.
///
/// Stops keep their route order and are split into consecutive days of
/// `ceil(stops / days)`; within a day activities start at 09:00, three hours
/// apart.
pub fn offline_itinerary(route: &Route, personality: Personality, duration: TripDuration) -> Itinerary {
    let places = route.places();
    let num_days = duration.itinerary_days();
    let per_day = places.len().div_ceil(num_days);

    let days = (0..num_days)
        .map(|d| {
            let start = (d * per_day).min(places.len());
            let end = (start + per_day).min(places.len());
            let day_places = &places[start..end];

            let activities = day_places
                .iter()
                .enumerate()
                .map(|(idx, place)| Activity {
                    time: format!("{:02}:00", FIRST_ACTIVITY_HOUR + idx * HOURS_BETWEEN_ACTIVITIES),
                    place_id: place.id.to_string(),
                    place_name: place.name.clone(),
                    duration: "2-3 hrs".to_string(),
                    description: place.description.clone().unwrap_or_else(|| {
                        format!("Explore {}, a must-visit spot in Chiang Mai", place.name)
                    }),
                    tips: tip_for(place).to_string(),
                    transport_to_next: (idx + 1 < day_places.len())
                        .then(|| "15-20 min by car or Grab".to_string()),
                    activity_type: ActivityType::Main,
                    is_nearby_recommendation: false,
                })
                .collect();

            DayItinerary {
                day: (d + 1) as u32,
                title: DAY_TITLES
                    .get(d)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| format!("Day {}", d + 1)),
                activities,
            }
        })
        .collect();

    Itinerary {
        trip_name: OFFLINE_TRIP_NAME.to_string(),
        total_days: num_days as u32,
        personality: personality.to_string(),
        summary: format!(
            "{}-day trip with {} stops. Optimized route for {} travelers.",
            num_days,
            places.len(),
            personality
        ),
        days,
        packing_tips: packing_tips(personality),
        budget_estimate: budget_estimate(num_days).to_string(),
        is_offline: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryItineraryCache;
    use crate::models::{Coordinates, Place};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted outcomes and records which model each call used
    struct ScriptedProvider {
        models: Vec<String>,
        script: Mutex<Vec<std::result::Result<(), bool>>>,
        calls: Mutex<Vec<String>>,
        count: AtomicUsize,
    }

    impl ScriptedProvider {
        /// `Err(true)` is an overload, `Err(false)` a hard failure
        fn new(models: &[&str], script: Vec<std::result::Result<(), bool>>) -> Self {
            ScriptedProvider {
                models: models.iter().map(|m| m.to_string()).collect(),
                script: Mutex::new(script.into_iter().rev().collect()),
                calls: Mutex::new(Vec::new()),
                count: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ItineraryProvider for ScriptedProvider {
        async fn generate(
            &self,
            model: &str,
            request: &ItineraryRequest<'_>,
        ) -> Result<Itinerary, ProviderError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(model.to_string());
            let next = self.script.lock().unwrap().pop().unwrap_or(Err(false));
            match next {
                Ok(()) => {
                    let mut itinerary =
                        offline_itinerary(request.route, request.personality, request.duration);
                    itinerary.is_offline = false;
                    itinerary.trip_name = format!("From {}", model);
                    Ok(itinerary)
                }
                Err(true) => Err(ProviderError::Overloaded("busy".to_string())),
                Err(false) => Err(ProviderError::Failed("bad request".to_string())),
            }
        }

        fn models(&self) -> &[String] {
            &self.models
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn online(
        provider: Arc<ScriptedProvider>,
        cache: Option<Arc<dyn ItineraryCache>>,
    ) -> ItineraryService {
        ItineraryService::new(Some(provider), cache, &ItineraryConfig::default())
            .with_backoff(Duration::from_millis(1))
    }

    fn route(n: usize) -> Route {
        Route::new(
            (0..n)
                .map(|i| {
                    Place::new(i.to_string(), format!("Stop {}", i), Coordinates { lat: 18.8, lng: 98.9 })
                        .with_tags(if i % 2 == 0 { &["Culture"] } else { &["Green"] })
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_offline_day_trip() {
        let itinerary = offline_itinerary(&route(3), Personality::Introvert, TripDuration::DayTrip);

        assert!(itinerary.is_offline);
        assert_eq!(itinerary.total_days, 1);
        assert_eq!(itinerary.days[0].title, "Adventure Begins 🌅");
        let times: Vec<&str> = itinerary.days[0].activities.iter().map(|a| a.time.as_str()).collect();
        assert_eq!(times, vec!["09:00", "12:00", "15:00"]);
        assert_eq!(itinerary.days[0].activities[0].tips, "Dress modestly for temples");
        assert_eq!(itinerary.days[0].activities[1].tips, "Bring water and sunscreen");
        assert!(itinerary.days[0].activities[2].transport_to_next.is_none());
        assert_eq!(itinerary.packing_tips[0], "Visit early morning to avoid crowds");
        assert_eq!(itinerary.budget_estimate, "~500-1,500 THB/person");
    }

    #[test]
    fn test_offline_splits_days_in_route_order() {
        let itinerary = offline_itinerary(&route(5), Personality::Default, TripDuration::OneNight);

        assert_eq!(itinerary.days.len(), 2);
        assert_eq!(itinerary.days[0].activities.len(), 3);
        assert_eq!(itinerary.days[1].activities.len(), 2);
        assert_eq!(itinerary.days[1].activities[0].place_id, "3");
        assert_eq!(itinerary.days[1].activities[0].time, "09:00");
        assert_eq!(itinerary.activity_count(), 5);
        assert!(itinerary.budget_estimate.contains("incl. stay"));
    }

    #[test]
    fn test_offline_empty_route() {
        let itinerary = offline_itinerary(&Route::empty(), Personality::Adventure, TripDuration::TwoNights);
        assert_eq!(itinerary.days.len(), 3);
        assert_eq!(itinerary.activity_count(), 0);
        assert_eq!(itinerary.days[2].title, "Northern Charm 🏔️");
    }

    #[test]
    fn test_missing_description_is_templated() {
        let itinerary = offline_itinerary(&route(1), Personality::Default, TripDuration::Custom);
        assert_eq!(
            itinerary.days[0].activities[0].description,
            "Explore Stop 0, a must-visit spot in Chiang Mai"
        );
    }

    #[tokio::test]
    async fn test_no_provider_means_offline() {
        let service = ItineraryService::new(None, None, &ItineraryConfig::default());
        let itinerary = service
            .generate(&route(2), Personality::Default, TripDuration::DayTrip, &[])
            .await;
        assert!(itinerary.is_offline);
        assert!(!service.is_online());
    }

    #[tokio::test]
    async fn test_overloaded_model_is_retried_before_falling_back() {
        let provider = Arc::new(ScriptedProvider::new(&["lite", "full"], vec![Err(true), Ok(())]));
        let service = online(provider.clone(), None);

        let itinerary = service
            .generate(&route(2), Personality::Default, TripDuration::DayTrip, &[])
            .await;

        assert!(!itinerary.is_offline);
        assert_eq!(itinerary.trip_name, "From lite");
        assert_eq!(provider.calls(), vec!["lite", "lite"]);
    }

    #[tokio::test]
    async fn test_hard_failure_moves_to_next_model() {
        let provider = Arc::new(ScriptedProvider::new(&["lite", "full"], vec![Err(false), Ok(())]));
        let service = online(provider.clone(), None);

        let itinerary = service
            .generate(&route(2), Personality::Default, TripDuration::DayTrip, &[])
            .await;

        assert_eq!(itinerary.trip_name, "From full");
        assert_eq!(provider.calls(), vec!["lite", "full"]);
    }

    #[tokio::test]
    async fn test_exhausted_models_fall_back_offline() {
        let provider = Arc::new(ScriptedProvider::new(
            &["lite", "full"],
            vec![Err(true), Err(true), Err(true), Err(true)],
        ));
        let service = online(provider.clone(), None);

        let itinerary = service
            .generate(&route(3), Personality::Extrovert, TripDuration::DayTrip, &[])
            .await;

        assert!(itinerary.is_offline);
        assert_eq!(itinerary.activity_count(), 3);
        assert_eq!(provider.count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_empty_route_never_calls_provider() {
        let provider = Arc::new(ScriptedProvider::new(&["lite"], vec![Ok(())]));
        let service = online(provider.clone(), None);

        let itinerary = service
            .generate(&Route::empty(), Personality::Default, TripDuration::DayTrip, &[])
            .await;

        assert!(itinerary.is_offline);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generated_itineraries_are_cached() {
        let provider = Arc::new(ScriptedProvider::new(&["lite"], vec![Ok(())]));
        let cache: Arc<dyn ItineraryCache> = Arc::new(MemoryItineraryCache::new(60, 10));
        let service = online(provider.clone(), Some(cache.clone()));
        let prefs = vec!["Coffee".to_string()];

        let first = service
            .generate(&route(2), Personality::Default, TripDuration::DayTrip, &prefs)
            .await;
        let second = service
            .generate(&route(2), Personality::Default, TripDuration::DayTrip, &prefs)
            .await;

        assert_eq!(first, second);
        assert_eq!(provider.count.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get_stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_offline_results_are_not_cached() {
        let provider = Arc::new(ScriptedProvider::new(&["lite"], vec![Err(false), Ok(())]));
        let cache: Arc<dyn ItineraryCache> = Arc::new(MemoryItineraryCache::new(60, 10));
        let service = online(provider.clone(), Some(cache));

        let first = service
            .generate(&route(2), Personality::Default, TripDuration::DayTrip, &[])
            .await;
        let second = service
            .generate(&route(2), Personality::Default, TripDuration::DayTrip, &[])
            .await;

        assert!(first.is_offline);
        assert!(!second.is_offline);
        assert_eq!(provider.count.load(Ordering::SeqCst), 2);
    }
}
