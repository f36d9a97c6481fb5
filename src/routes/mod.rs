pub mod health;
pub mod journeys;
pub mod places;
pub mod users;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/places", get(places::list_places))
        .route(
            "/places/{place_id}/reviews",
            get(places::list_reviews).post(places::add_review),
        )
        .route("/rewards", get(users::list_rewards))
        .route("/users/sync", post(users::sync_user))
        .route("/users/{user_id}", get(users::get_user))
        .route("/users/{user_id}/shortcut", post(users::mark_shortcut))
        .route(
            "/users/{user_id}/liked",
            get(users::get_liked)
                .post(users::like_place)
                .put(users::set_liked)
                .delete(users::clear_liked),
        )
        .route(
            "/users/{user_id}/liked/{place_id}",
            delete(users::unlike_place),
        )
        .route(
            "/users/{user_id}/redemptions",
            get(users::list_redemptions).post(users::redeem_reward),
        )
        .route(
            "/users/{user_id}/journey",
            get(journeys::current_journey).post(journeys::start_journey),
        )
        .route(
            "/users/{user_id}/journey/regenerate",
            post(journeys::regenerate_journey),
        )
        .route("/users/{user_id}/journey/map", get(journeys::journey_map))
        .route("/users/{user_id}/journey/visit", post(journeys::visit_place))
        .route(
            "/users/{user_id}/journey/emergency",
            post(journeys::emergency_plan),
        )
        .route(
            "/users/{user_id}/journey/substitute",
            post(journeys::substitute_stop),
        )
        .route(
            "/users/{user_id}/journey/itinerary",
            post(journeys::generate_itinerary),
        )
        .with_state(state)
}
