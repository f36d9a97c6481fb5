use crate::error::Result;
use crate::models::{Place, PlaceId, Review};
use crate::services::review_service::NewReview;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    pub places: Vec<Place>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub review: Review,
    pub total_coins: i64,
}

/// GET /places
pub async fn list_places(State(state): State<Arc<AppState>>) -> Result<Json<PlacesResponse>> {
    let places = state.catalog.places().await?;
    Ok(Json(PlacesResponse { places }))
}

/// GET /places/{place_id}/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
) -> Result<Json<Vec<Review>>> {
    let reviews = state.reviews.reviews_for_place(&PlaceId::new(place_id)).await?;
    Ok(Json(reviews))
}

/// POST /places/{place_id}/reviews
/// Stores the review and credits the reviewer's bonus
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
    Json(request): Json<NewReview>,
) -> Result<(StatusCode, Json<ReviewResponse>)> {
    let (review, total_coins) = state
        .reviews
        .add_review(&PlaceId::new(place_id), request)
        .await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse { review, total_coins })))
}
