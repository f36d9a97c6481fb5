//! Route planning: rank and cap candidates, order them into a walkable
//! sequence, and patch existing routes when a stop has to be dropped.

pub mod ranking;
pub mod selection;
pub mod sequencing;

pub use ranking::{strategy_for, KeywordStrategy, RankingStrategy, RatingStrategy};
pub use selection::select_places;
pub use sequencing::order_by_nearest_neighbor;

use crate::config::PlannerConfig;
use crate::error::{AppError, Result};
use crate::models::{Personality, Place, PlaceId, Route, TripDuration};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Build a route from `candidates`: select, then sequence.
///
/// Every call draws fresh randomness, so composing twice over the same
/// candidates may return different stops. Repeated candidate ids are
/// collapsed to their first occurrence.
pub fn compose_route<R>(
    candidates: &[Place],
    personality: Personality,
    duration: TripDuration,
    config: &PlannerConfig,
    rng: &mut R,
) -> Route
where
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        tracing::debug!("No candidates for {} / {}, returning empty route", personality, duration);
        return Route::empty();
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    let unique: Vec<Place> = candidates
        .iter()
        .filter(|p| seen.insert(p.id.clone()))
        .cloned()
        .collect();
    if unique.len() != candidates.len() {
        tracing::warn!(
            "Dropped {} repeated candidate(s) before planning",
            candidates.len() - unique.len()
        );
    }

    let selected = select_places(&unique, personality, duration, config, rng);
    let route = Route::from_unique(order_by_nearest_neighbor(selected));

    tracing::info!(
        "Composed route with {} stops ({:.2} km) for {} / {}",
        route.len(),
        route.total_distance_km(),
        personality,
        duration
    );

    route
}

/// Copy of `route` with `target` replaced by `replacement` in the same slot.
/// The rest of the sequence is not reordered.
pub fn substitute_stop(route: &Route, target: &PlaceId, replacement: Place) -> Result<Route> {
    let index = route
        .position_of(target)
        .ok_or_else(|| AppError::NotFound(format!("Place '{}' is not in the route", target)))?;

    if replacement.id != *target && route.contains(&replacement.id) {
        return Err(AppError::InvalidRequest(format!(
            "Place '{}' is already in the route",
            replacement.id
        )));
    }

    let mut updated = route.clone();
    updated.replace_at(index, replacement);
    Ok(updated)
}

/// Stop to replace during an emergency replan, plus the places offered in
/// its stead. Picking one is left to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyPlan {
    pub target: Place,
    pub alternatives: Vec<Place>,
}

/// Propose replacements for the next stop of `route`.
///
/// The target is the first stop not in `visited`, or the first stop when
/// everything has been visited. Alternatives come from `liked` minus the
/// route; when none remain, the other unvisited route members are offered
/// instead. Returns `None` for an empty route.
pub fn emergency_alternatives<R>(
    route: &Route,
    visited: &HashSet<PlaceId>,
    liked: &[Place],
    config: &PlannerConfig,
    rng: &mut R,
) -> Option<EmergencyPlan>
where
    R: Rng + ?Sized,
{
    let places = route.places();
    let target = places
        .iter()
        .find(|p| !visited.contains(&p.id))
        .or_else(|| places.first())?
        .clone();

    let mut seen = HashSet::new();
    let mut alternatives: Vec<Place> = liked
        .iter()
        .filter(|p| p.id != target.id && !route.contains(&p.id))
        .filter(|p| seen.insert(p.id.clone()))
        .cloned()
        .collect();

    if alternatives.is_empty() {
        tracing::debug!("No liked places outside the route, offering unvisited stops");
        alternatives = places
            .iter()
            .filter(|p| p.id != target.id && !visited.contains(&p.id))
            .cloned()
            .collect();
    }

    alternatives.shuffle(rng);
    alternatives.truncate(config.max_alternatives);

    Some(EmergencyPlan {
        target,
        alternatives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn place(id: &str, lat: f64, lng: f64) -> Place {
        Place::new(id, format!("Place {}", id), Coordinates { lat, lng })
    }

    fn route(ids: &[&str]) -> Route {
        Route::new(
            ids.iter()
                .enumerate()
                .map(|(i, id)| place(id, 18.78 + i as f64 * 0.01, 98.95))
                .collect(),
        )
        .unwrap()
    }

    fn ids(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_compose_empty_is_empty_route() {
        let mut rng = StdRng::seed_from_u64(0);
        let route = compose_route(
            &[],
            Personality::Introvert,
            TripDuration::DayTrip,
            &PlannerConfig::default(),
            &mut rng,
        );
        assert!(route.is_empty());
    }

    #[test]
    fn test_compose_collapses_repeated_ids() {
        let mut rng = StdRng::seed_from_u64(0);
        let candidates = vec![place("a", 18.8, 98.9), place("a", 18.7, 98.9), place("b", 18.81, 98.9)];
        let route = compose_route(
            &candidates,
            Personality::Default,
            TripDuration::Custom,
            &PlannerConfig::default(),
            &mut rng,
        );
        assert_eq!(route.len(), 2);
        assert_eq!(route.places()[0].coordinates.lat, 18.8);
    }

    #[test]
    fn test_substitute_replaces_in_place() {
        let original = route(&["1", "2", "3"]);
        let updated = substitute_stop(&original, &"2".into(), place("9", 18.9, 98.9)).unwrap();

        assert_eq!(ids(updated.places()), vec!["1", "9", "3"]);
        assert_eq!(ids(original.places()), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_substitute_missing_target_is_not_found() {
        let original = route(&["1", "2"]);
        let err = substitute_stop(&original, &"7".into(), place("9", 18.9, 98.9)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_substitute_rejects_duplicate_replacement() {
        let original = route(&["1", "2"]);
        let err = substitute_stop(&original, &"1".into(), place("2", 18.9, 98.9)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_emergency_targets_first_unvisited() {
        let r = route(&["1", "2", "3"]);
        let visited: HashSet<PlaceId> = ["1".into()].into_iter().collect();
        let liked = vec![place("1", 0.0, 0.0), place("4", 0.0, 0.0), place("5", 0.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(11);

        let plan = emergency_alternatives(&r, &visited, &liked, &PlannerConfig::default(), &mut rng)
            .unwrap();

        assert_eq!(plan.target.id.as_str(), "2");
        let mut alt = ids(&plan.alternatives);
        alt.sort();
        assert_eq!(alt, vec!["4", "5"]);
    }

    #[test]
    fn test_emergency_falls_back_to_unvisited_route_members() {
        let r = route(&["1", "2", "3", "4"]);
        let visited: HashSet<PlaceId> = ["3".into()].into_iter().collect();
        let liked = vec![place("2", 0.0, 0.0), place("4", 0.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(5);

        let plan = emergency_alternatives(&r, &visited, &liked, &PlannerConfig::default(), &mut rng)
            .unwrap();

        assert_eq!(plan.target.id.as_str(), "1");
        let mut alt = ids(&plan.alternatives);
        alt.sort();
        assert_eq!(alt, vec!["2", "4"]);
    }

    #[test]
    fn test_emergency_all_visited_targets_first_stop() {
        let r = route(&["1", "2"]);
        let visited: HashSet<PlaceId> = ["1".into(), "2".into()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(5);

        let plan =
            emergency_alternatives(&r, &visited, &[], &PlannerConfig::default(), &mut rng).unwrap();
        assert_eq!(plan.target.id.as_str(), "1");
        assert!(plan.alternatives.is_empty());
    }

    #[test]
    fn test_emergency_caps_alternatives() {
        let r = route(&["1"]);
        let liked: Vec<Place> = (10..22).map(|i| place(&i.to_string(), 18.8, 98.9)).collect();
        let mut rng = StdRng::seed_from_u64(2);

        let plan = emergency_alternatives(&r, &HashSet::new(), &liked, &PlannerConfig::default(), &mut rng)
            .unwrap();
        assert_eq!(plan.alternatives.len(), 5);
    }

    #[test]
    fn test_emergency_empty_route() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(emergency_alternatives(
            &Route::empty(),
            &HashSet::new(),
            &[],
            &PlannerConfig::default(),
            &mut rng
        )
        .is_none());
    }
}
