use axum::Router;
use lonq::cache::{ItineraryCache, MemoryItineraryCache, RedisItineraryCache};
use lonq::config::Config;
use lonq::constants::DEFAULT_MEMORY_CACHE_MAX_ENTRIES;
use lonq::services::gemini::GeminiClient;
use lonq::services::itinerary_service::ItineraryProvider;
use lonq::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use lonq::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lonq=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting LonQ API server");
    tracing::info!("Configuration loaded successfully");

    // Document store: Postgres when configured, in-memory otherwise
    let store: Arc<dyn DocumentStore> = if let Some(ref database_url) = config.database_url {
        tracing::info!("Connecting to database...");
        let db_pool = lonq::store::create_pool(database_url).await?;
        tracing::info!("Database connection established");

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Database migrations completed");

        Arc::new(PgDocumentStore::new(db_pool))
    } else {
        tracing::warn!("DATABASE_URL not configured. Using in-memory document store.");
        Arc::new(MemoryDocumentStore::new())
    };

    // Initialize cache: try Redis, fall back to in-memory
    let cache: Arc<dyn ItineraryCache> = if let Some(ref redis_url) = config.redis_url {
        tracing::info!("Connecting to Redis cache...");
        match RedisItineraryCache::new(redis_url, config.itinerary_cache_ttl).await {
            Ok(redis_cache) => {
                tracing::info!("Redis cache connection established");
                Arc::new(redis_cache)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Falling back to in-memory cache.",
                    e
                );
                Arc::new(MemoryItineraryCache::new(
                    config.itinerary_cache_ttl,
                    DEFAULT_MEMORY_CACHE_MAX_ENTRIES,
                ))
            }
        }
    } else {
        tracing::info!("Redis URL not configured. Using in-memory cache.");
        Arc::new(MemoryItineraryCache::new(
            config.itinerary_cache_ttl,
            DEFAULT_MEMORY_CACHE_MAX_ENTRIES,
        ))
    };

    let provider: Option<Arc<dyn ItineraryProvider>> = match GeminiClient::from_config(&config.itinerary) {
        Some(client) => {
            tracing::info!("Itinerary models: {}", config.itinerary.gemini_models.join(", "));
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not configured. Itineraries will be generated offline.");
            None
        }
    };

    // Create application state
    let state = AppState::new(&config, store, Some(cache), provider);
    let seeded = state.catalog.seed().await?;
    tracing::info!("Catalog seeding wrote {} places", seeded);
    let state = Arc::new(state);

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", lonq::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
