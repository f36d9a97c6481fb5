use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /health - Check if the store, cache and itinerary provider are reachable
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {}
    });

    // Document store
    if state.store.health_check().await {
        status["checks"]["store"] = json!({ "backend": state.store.backend_name(), "status": "ok" });
    } else {
        status["checks"]["store"] = json!({ "backend": state.store.backend_name(), "status": "error" });
        status["status"] = json!("error");
    }

    // Itinerary cache is optional; failures degrade, they don't fail the check
    match state.itineraries.cache() {
        Some(cache) => {
            let healthy = cache.health_check().await;
            status["checks"]["cache"] = json!({
                "backend": cache.backend_name(),
                "status": if healthy { "ok" } else { "degraded" },
                "stats": cache.get_stats().await,
            });
        }
        None => {
            status["checks"]["cache"] = json!("disabled");
        }
    }

    status["checks"]["itinerary"] = json!(if state.itineraries.is_online() {
        "online"
    } else {
        "offline"
    });

    Json(status)
}
