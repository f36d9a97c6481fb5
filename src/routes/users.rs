use crate::error::{AppError, Result};
use crate::models::{PlaceId, Redemption, Reward, UserProfile};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sign-in payload from the LINE front-end
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUserRequest {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub place_id: PlaceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLikedRequest {
    pub place_ids: Vec<PlaceId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedResponse {
    pub liked_places: Vec<PlaceId>,
    /// Whether the request changed the list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub reward_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub redemption: Redemption,
    pub total_coins: i64,
}

/// POST /users/sync
pub async fn sync_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncUserRequest>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .users
        .sync_user(&request.user_id, &request.display_name, request.picture_url)
        .await?;
    Ok(Json(profile))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.users.get_user(&user_id).await?))
}

/// POST /users/{user_id}/shortcut
pub async fn mark_shortcut(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    state.users.mark_shortcut_added(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/{user_id}/liked
pub async fn get_liked(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<LikedResponse>> {
    Ok(Json(LikedResponse {
        liked_places: state.users.liked_places(&user_id).await?,
        changed: None,
    }))
}

/// POST /users/{user_id}/liked
/// Only catalog places can be liked
pub async fn like_place(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<LikeRequest>,
) -> Result<Json<LikedResponse>> {
    state.catalog.find(&request.place_id).await?;
    let changed = state.users.like(&user_id, request.place_id).await?;
    Ok(Json(LikedResponse {
        liked_places: state.users.liked_places(&user_id).await?,
        changed: Some(changed),
    }))
}

/// PUT /users/{user_id}/liked
pub async fn set_liked(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<SetLikedRequest>,
) -> Result<Json<LikedResponse>> {
    let liked_places = state.users.set_liked(&user_id, request.place_ids).await?;
    Ok(Json(LikedResponse {
        liked_places,
        changed: Some(true),
    }))
}

/// DELETE /users/{user_id}/liked
pub async fn clear_liked(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    state.users.clear_liked(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/{user_id}/liked/{place_id}
pub async fn unlike_place(
    State(state): State<Arc<AppState>>,
    Path((user_id, place_id)): Path<(String, String)>,
) -> Result<Json<LikedResponse>> {
    let changed = state.users.unlike(&user_id, &PlaceId::new(place_id)).await?;
    Ok(Json(LikedResponse {
        liked_places: state.users.liked_places(&user_id).await?,
        changed: Some(changed),
    }))
}

/// GET /rewards
pub async fn list_rewards(State(state): State<Arc<AppState>>) -> Json<Vec<Reward>> {
    Json(state.catalog.rewards().to_vec())
}

/// POST /users/{user_id}/redemptions
pub async fn redeem_reward(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<RedeemRequest>,
) -> Result<(StatusCode, Json<RedeemResponse>)> {
    if request.reward_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("rewardId must not be empty".to_string()));
    }
    let reward = state.catalog.reward(&request.reward_id)?;
    let redemption = state.users.redeem_reward(&user_id, reward).await?;
    let total_coins = state.users.coins(&user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(RedeemResponse {
            redemption,
            total_coins,
        }),
    ))
}

/// GET /users/{user_id}/redemptions
pub async fn list_redemptions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Redemption>>> {
    Ok(Json(state.users.redemptions(&user_id).await?))
}
