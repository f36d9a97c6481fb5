// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod planner;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use error::{AppError, Result};

use cache::ItineraryCache;
use config::Config;
use services::catalog::CatalogService;
use services::itinerary_service::{ItineraryProvider, ItineraryService};
use services::journey_service::JourneyService;
use services::review_service::ReviewService;
use services::user_service::UserService;
use std::sync::Arc;
use store::DocumentStore;

// App state for sharing across the application
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub catalog: Arc<CatalogService>,
    pub users: Arc<UserService>,
    pub journeys: JourneyService,
    pub reviews: ReviewService,
    pub itineraries: ItineraryService,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn DocumentStore>,
        cache: Option<Arc<dyn ItineraryCache>>,
        provider: Option<Arc<dyn ItineraryProvider>>,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(store.clone()));
        let users = Arc::new(UserService::new(store.clone()));

        AppState {
            journeys: JourneyService::new(
                store.clone(),
                catalog.clone(),
                users.clone(),
                config.planner.clone(),
                config.coins,
            ),
            reviews: ReviewService::new(store.clone(), catalog.clone(), users.clone(), config.coins),
            itineraries: ItineraryService::new(provider, cache, &config.itinerary),
            store,
            catalog,
            users,
        }
    }
}
