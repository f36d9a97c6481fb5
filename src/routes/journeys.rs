use crate::error::{AppError, Result};
use crate::models::{
    Itinerary, Journey, JourneyStatus, Personality, PlaceId, RouteMarker, TripDuration,
    VisitOutcome,
};
use crate::planner::EmergencyPlan;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Personality and duration arrive as the labels shown in the app,
/// e.g. "introvert mode" or "2 วัน 1 คืน"
#[derive(Debug, Default, Deserialize)]
pub struct StartJourneyRequest {
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    pub place_id: PlaceId,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstituteRequest {
    pub target_place_id: PlaceId,
    pub replacement_place_id: PlaceId,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItineraryBody {
    #[serde(default)]
    pub preferences: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    pub journey: Journey,
    pub status: JourneyStatus,
    pub total_distance_km: f64,
}

impl From<Journey> for JourneyResponse {
    fn from(journey: Journey) -> Self {
        JourneyResponse {
            status: journey.status(),
            total_distance_km: journey.route().total_distance_km(),
            journey,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub markers: Vec<RouteMarker>,
    pub geojson: FeatureCollection,
}

#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub outcome: VisitOutcome,
    pub total_coins: i64,
}

#[derive(Debug, Serialize)]
pub struct EmergencyResponse {
    pub plan: Option<EmergencyPlan>,
}

fn parse_personality(raw: &str) -> Result<Personality> {
    raw.parse().map_err(AppError::InvalidRequest)
}

fn parse_duration(raw: &str) -> Result<TripDuration> {
    raw.parse().map_err(AppError::InvalidRequest)
}

async fn require_journey(state: &AppState, user_id: &str) -> Result<Journey> {
    state
        .journeys
        .current(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' has no journey", user_id)))
}

/// POST /users/{user_id}/journey
/// Resume the current journey or plan one from the user's liked places
pub async fn start_journey(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<StartJourneyRequest>,
) -> Result<Json<JourneyResponse>> {
    let personality = parse_personality(&request.personality)?;
    let duration = parse_duration(&request.duration)?;

    tracing::info!(
        user_id = %user_id,
        personality = %personality,
        duration = %duration,
        "Journey request: {} / {}",
        personality,
        duration
    );

    let journey = state.journeys.start(&user_id, personality, duration).await?;
    Ok(Json(journey.into()))
}

/// GET /users/{user_id}/journey
pub async fn current_journey(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<JourneyResponse>> {
    Ok(Json(require_journey(&state, &user_id).await?.into()))
}

/// POST /users/{user_id}/journey/regenerate
pub async fn regenerate_journey(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<RegenerateRequest>,
) -> Result<Json<JourneyResponse>> {
    let personality = request.personality.as_deref().map(parse_personality).transpose()?;
    let duration = request.duration.as_deref().map(parse_duration).transpose()?;

    let journey = state
        .journeys
        .regenerate(&user_id, personality, duration)
        .await?;
    Ok(Json(journey.into()))
}

/// GET /users/{user_id}/journey/map
/// Numbered markers and a GeoJSON path for the map view
pub async fn journey_map(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<MapResponse>> {
    let route = require_journey(&state, &user_id).await?.route();
    Ok(Json(MapResponse {
        markers: route.markers(),
        geojson: route.to_geojson(),
    }))
}

/// POST /users/{user_id}/journey/visit
pub async fn visit_place(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<VisitRequest>,
) -> Result<Json<VisitResponse>> {
    let outcome = state
        .journeys
        .visit(&user_id, &request.place_id, request.photos)
        .await?;
    let total_coins = state.users.coins(&user_id).await?;
    Ok(Json(VisitResponse {
        outcome,
        total_coins,
    }))
}

/// POST /users/{user_id}/journey/emergency
pub async fn emergency_plan(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<EmergencyResponse>> {
    let plan = state.journeys.emergency_plan(&user_id).await?;
    Ok(Json(EmergencyResponse { plan }))
}

/// POST /users/{user_id}/journey/substitute
pub async fn substitute_stop(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<SubstituteRequest>,
) -> Result<Json<JourneyResponse>> {
    let journey = state
        .journeys
        .substitute(&user_id, &request.target_place_id, &request.replacement_place_id)
        .await?;
    Ok(Json(journey.into()))
}

/// POST /users/{user_id}/journey/itinerary
/// Always answers: falls back to an offline itinerary when generation fails
pub async fn generate_itinerary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<ItineraryBody>,
) -> Result<Json<Itinerary>> {
    let journey = require_journey(&state, &user_id).await?;
    let itinerary = state
        .itineraries
        .generate(
            &journey.route(),
            journey.personality,
            journey.duration,
            &request.preferences,
        )
        .await;
    Ok(Json(itinerary))
}
