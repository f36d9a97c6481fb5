use lonq::models::{JourneyStatus, Personality, PlaceId, TripDuration};
use lonq::AppError;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

mod common;

#[tokio::test]
async fn test_two_stop_journey_awards_photo_coins_and_bonus_once() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &["1", "2"], 0).await;

    let journey = assert_ok!(
        state
            .journeys
            .start("U1", Personality::Default, TripDuration::Custom)
            .await
    );
    assert_eq!(journey.stops.len(), 2);
    let first = journey.stops[0].place.id.clone();
    let second = journey.stops[1].place.id.clone();

    let outcome = assert_ok!(
        state
            .journeys
            .visit("U1", &first, vec!["a.jpg".into(), "b.jpg".into()])
            .await
    );
    assert_eq!(outcome.coins_earned, 20);
    assert!(outcome.visited);
    assert!(!outcome.journey_completed);
    assert_eq!(state.users.coins("U1").await.unwrap(), 20);

    let outcome = assert_ok!(state.journeys.visit("U1", &second, vec!["c.jpg".into()]).await);
    assert_eq!(outcome.coins_earned, 110);
    assert_eq!(outcome.completion_bonus, 100);
    assert!(outcome.journey_completed);
    assert_eq!(state.users.coins("U1").await.unwrap(), 130);

    let journey = state.journeys.current("U1").await.unwrap().unwrap();
    assert_eq!(journey.status(), JourneyStatus::Completed);
    assert_eq!(journey.total_coins, 130);

    // Revisiting a completed journey earns nothing
    let again = assert_ok!(state.journeys.visit("U1", &second, vec!["d.jpg".into()]).await);
    assert_eq!(again.coins_earned, 0);
    assert_eq!(state.users.coins("U1").await.unwrap(), 130);
}

#[tokio::test]
async fn test_visit_without_photo_earns_nothing() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &["1", "2"], 0).await;
    let journey = state
        .journeys
        .start("U1", Personality::Default, TripDuration::Custom)
        .await
        .unwrap();

    let outcome = assert_ok!(
        state
            .journeys
            .visit("U1", &journey.stops[0].place.id, Vec::new())
            .await
    );
    assert_eq!(outcome.coins_earned, 0);
    assert!(!outcome.visited);

    let journey = state.journeys.current("U1").await.unwrap().unwrap();
    assert_eq!(journey.status(), JourneyStatus::Planned);
    assert_eq!(state.users.coins("U1").await.unwrap(), 0);
}

#[tokio::test]
async fn test_visit_is_idempotent() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &["1", "2", "3"], 0).await;
    let journey = state
        .journeys
        .start("U1", Personality::Default, TripDuration::Custom)
        .await
        .unwrap();
    let stop = journey.stops[0].place.id.clone();

    state.journeys.visit("U1", &stop, vec!["a.jpg".into()]).await.unwrap();
    let second = state.journeys.visit("U1", &stop, vec!["b.jpg".into()]).await.unwrap();

    assert_eq!(second.coins_earned, 0);
    assert!(second.visited);
    assert_eq!(state.users.coins("U1").await.unwrap(), 10);
    let journey = state.journeys.current("U1").await.unwrap().unwrap();
    assert_eq!(journey.stop(&stop).unwrap().photos, vec!["a.jpg".to_string()]);
}

#[tokio::test]
async fn test_concurrent_visits_credit_once() {
    let state = std::sync::Arc::new(common::setup_test_state());
    common::create_user(&state, "U1", &["1", "2", "3"], 0).await;
    let journey = state
        .journeys
        .start("U1", Personality::Default, TripDuration::Custom)
        .await
        .unwrap();
    let stop = journey.stops[0].place.id.clone();

    let visits = (0..5).map(|i| {
        let state = state.clone();
        let stop = stop.clone();
        async move {
            state
                .journeys
                .visit("U1", &stop, vec![format!("{}.jpg", i)])
                .await
        }
    });
    let results = futures::future::join_all(visits).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(state.users.coins("U1").await.unwrap(), 10);
}

#[tokio::test]
async fn test_visit_unknown_place_is_not_found() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &["1"], 0).await;
    state
        .journeys
        .start("U1", Personality::Default, TripDuration::Custom)
        .await
        .unwrap();

    let err = assert_err!(state.journeys.visit("U1", &PlaceId::new("99"), vec!["a.jpg".into()]).await);
    assert!(matches!(err, AppError::NotFound(_)));

    let err = assert_err!(state.journeys.visit("nobody", &PlaceId::new("1"), vec![]).await);
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_start_resumes_matching_journey() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &["1", "2", "3", "4", "5", "6", "7"], 0).await;

    let first = state
        .journeys
        .start("U1", Personality::Extrovert, TripDuration::DayTrip)
        .await
        .unwrap();
    let resumed = state
        .journeys
        .start("U1", Personality::Extrovert, TripDuration::DayTrip)
        .await
        .unwrap();
    assert_eq!(first.id, resumed.id);
    assert_eq!(first.stops, resumed.stops);

    let replanned = state
        .journeys
        .start("U1", Personality::Introvert, TripDuration::DayTrip)
        .await
        .unwrap();
    assert_ne!(first.id, replanned.id);
    assert_eq!(replanned.personality, Personality::Introvert);
    assert_eq!(replanned.stops.len(), 3);
}

#[tokio::test]
async fn test_regenerate_discards_progress_and_keeps_settings() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &["1", "2", "3", "4", "5", "6", "7"], 0).await;

    let journey = state
        .journeys
        .start("U1", Personality::Adventure, TripDuration::DayTrip)
        .await
        .unwrap();
    state
        .journeys
        .visit("U1", &journey.stops[0].place.id, vec!["a.jpg".into()])
        .await
        .unwrap();

    let regenerated = assert_ok!(state.journeys.regenerate("U1", None, None).await);
    assert_ne!(regenerated.id, journey.id);
    assert_eq!(regenerated.personality, Personality::Adventure);
    assert_eq!(regenerated.duration, TripDuration::DayTrip);
    assert_eq!(regenerated.status(), JourneyStatus::Planned);
    assert_eq!(regenerated.stops.len(), 3);

    // Coins already credited are kept
    assert_eq!(state.users.coins("U1").await.unwrap(), 10);
}

#[tokio::test]
async fn test_no_liked_places_gives_empty_journey() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &[], 0).await;

    let journey = assert_ok!(
        state
            .journeys
            .start("U1", Personality::Default, TripDuration::DayTrip)
            .await
    );
    assert!(journey.stops.is_empty());
    assert!(state.journeys.emergency_plan("U1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_emergency_offers_liked_places_outside_route() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &["1", "2", "3", "4", "5", "6", "7", "8"], 0).await;

    let journey = state
        .journeys
        .start("U1", Personality::Default, TripDuration::DayTrip)
        .await
        .unwrap();
    let plan = state.journeys.emergency_plan("U1").await.unwrap().unwrap();

    assert_eq!(plan.target.id, journey.stops[0].place.id);
    assert!(!plan.alternatives.is_empty());
    assert!(plan.alternatives.len() <= 5);
    let route = journey.route();
    assert!(plan.alternatives.iter().all(|p| !route.contains(&p.id)));
}

#[tokio::test]
async fn test_substitute_keeps_progress_on_other_stops() {
    let state = common::setup_test_state();
    common::create_user(&state, "U1", &["1", "2", "3", "4", "5", "6", "7", "8"], 0).await;

    let journey = state
        .journeys
        .start("U1", Personality::Default, TripDuration::DayTrip)
        .await
        .unwrap();
    let visited = journey.stops[0].place.id.clone();
    let target = journey.stops[1].place.id.clone();
    state
        .journeys
        .visit("U1", &visited, vec!["a.jpg".into()])
        .await
        .unwrap();

    let replacement = ["1", "2", "3", "4", "5", "6", "7", "8"]
        .iter()
        .map(|id| PlaceId::new(*id))
        .find(|id| !journey.route().contains(id))
        .unwrap();

    let updated = assert_ok!(state.journeys.substitute("U1", &target, &replacement).await);
    assert_eq!(updated.stops[1].place.id, replacement);
    assert!(!updated.stops[1].visited);
    assert!(updated.stops[0].visited);
    assert_eq!(updated.stops.len(), 3);

    // A visited stop cannot be replaced
    let err = assert_err!(state.journeys.substitute("U1", &visited, &target).await);
    assert!(matches!(err, AppError::InvalidRequest(_)));

    // Unknown target leaves the journey unchanged
    let err = assert_err!(
        state
            .journeys
            .substitute("U1", &PlaceId::new("404"), &target)
            .await
    );
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(state.journeys.current("U1").await.unwrap().unwrap(), updated);
}

#[tokio::test]
async fn test_failed_visit_credit_leaves_journey_unvisited() {
    let store = Arc::new(common::FlakyBalanceStore::default());
    let state = common::setup_test_state_with_store(store.clone());
    common::create_user(&state, "U1", &["1", "2"], 0).await;

    let journey = state
        .journeys
        .start("U1", Personality::Default, TripDuration::Custom)
        .await
        .unwrap();
    let first = journey.stops[0].place.id.clone();

    store.set_outage(true);
    let err = assert_err!(state.journeys.visit("U1", &first, vec!["a.jpg".into()]).await);
    assert!(matches!(err, AppError::Store(_)));
    store.set_outage(false);

    let stored = state.journeys.current("U1").await.unwrap().unwrap();
    assert!(!stored.stops[0].visited);
    assert_eq!(stored.stops[0].coins_earned, 0);
    assert_eq!(stored.total_coins, 0);
    assert_eq!(state.users.coins("U1").await.unwrap(), 0);

    // The visit is still worth its coins once the store recovers
    let outcome = assert_ok!(state.journeys.visit("U1", &first, vec!["a.jpg".into()]).await);
    assert_eq!(outcome.coins_earned, 10);
    assert_eq!(state.users.coins("U1").await.unwrap(), 10);
    assert_eq!(state.journeys.current("U1").await.unwrap().unwrap().total_coins, 10);
}
