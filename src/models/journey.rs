use crate::config::CoinRules;
use crate::error::{AppError, Result};
use crate::models::{Personality, Place, PlaceId, Route, TripDuration};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    Planned,
    InProgress,
    Completed,
}

/// Per-stop progress: a place counts as visited only once photographed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyStop {
    #[serde(flatten)]
    pub place: Place,
    pub visited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visited_at: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub coins_earned: u32,
}

impl JourneyStop {
    fn unvisited(place: Place) -> Self {
        JourneyStop {
            place,
            visited: false,
            visited_at: None,
            photos: Vec::new(),
            coins_earned: 0,
        }
    }
}

/// A route plus one user's visit, photo and coin progress along it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub id: Uuid,
    pub personality: Personality,
    pub duration: TripDuration,
    pub stops: Vec<JourneyStop>,
    pub total_coins: u32,
    pub started_at: String,
    pub completed: bool,
}

/// Result of a visit attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitOutcome {
    pub place_id: PlaceId,
    /// Photo coins plus the completion bonus, if awarded by this visit
    pub coins_earned: u32,
    pub completion_bonus: u32,
    pub visited: bool,
    pub journey_completed: bool,
}

impl Journey {
    pub fn new(route: Route, personality: Personality, duration: TripDuration) -> Self {
        Journey {
            id: Uuid::new_v4(),
            personality,
            duration,
            stops: route.into_places().into_iter().map(JourneyStop::unvisited).collect(),
            total_coins: 0,
            started_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "unknown".to_string()),
            completed: false,
        }
    }

    pub fn status(&self) -> JourneyStatus {
        if self.completed {
            JourneyStatus::Completed
        } else if self.stops.iter().any(|s| s.visited) {
            JourneyStatus::InProgress
        } else {
            JourneyStatus::Planned
        }
    }

    pub fn route(&self) -> Route {
        // Stops are built from a Route and substitutions keep ids unique
        Route::from_unique(self.stops.iter().map(|s| s.place.clone()).collect())
    }

    pub fn stop(&self, place_id: &PlaceId) -> Option<&JourneyStop> {
        self.stops.iter().find(|s| &s.place.id == place_id)
    }

    pub fn visited_ids(&self) -> HashSet<PlaceId> {
        self.stops
            .iter()
            .filter(|s| s.visited)
            .map(|s| s.place.id.clone())
            .collect()
    }

    /// Record a visit evidenced by `photos`.
    ///
    /// Without photos nothing changes and no coins are earned. Visiting an
    /// already visited stop is a no-op. The visit that covers the last
    /// unvisited stop completes the journey and adds the completion bonus.
    pub fn visit(
        &mut self,
        place_id: &PlaceId,
        photos: Vec<String>,
        rules: &CoinRules,
    ) -> Result<VisitOutcome> {
        let stop = self
            .stops
            .iter_mut()
            .find(|s| &s.place.id == place_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Place '{}' is not part of this journey", place_id))
            })?;

        if stop.visited || photos.is_empty() {
            return Ok(VisitOutcome {
                place_id: place_id.clone(),
                coins_earned: 0,
                completion_bonus: 0,
                visited: stop.visited,
                journey_completed: self.completed,
            });
        }

        let photo_count = u32::try_from(photos.len()).unwrap_or(u32::MAX);
        let photo_coins = rules.coins_per_photo.saturating_mul(photo_count);
        stop.visited = true;
        stop.visited_at = OffsetDateTime::now_utc().format(&Rfc3339).ok();
        stop.photos = photos;
        stop.coins_earned = photo_coins;
        self.total_coins = self.total_coins.saturating_add(photo_coins);

        let mut completion_bonus = 0;
        if !self.completed && self.stops.iter().all(|s| s.visited) {
            self.completed = true;
            completion_bonus = rules.completion_bonus;
            self.total_coins = self.total_coins.saturating_add(completion_bonus);
        }

        Ok(VisitOutcome {
            place_id: place_id.clone(),
            coins_earned: photo_coins.saturating_add(completion_bonus),
            completion_bonus,
            visited: true,
            journey_completed: self.completed,
        })
    }

    /// Swap an unvisited stop for `replacement` in the same position.
    /// Progress on every other stop is kept.
    pub fn substitute_stop(&mut self, target: &PlaceId, replacement: Place) -> Result<()> {
        let index = self
            .stops
            .iter()
            .position(|s| &s.place.id == target)
            .ok_or_else(|| {
                AppError::NotFound(format!("Place '{}' is not part of this journey", target))
            })?;

        if self.stops[index].visited {
            return Err(AppError::InvalidRequest(format!(
                "Place '{}' was already visited and cannot be replaced",
                target
            )));
        }
        if replacement.id != *target && self.stop(&replacement.id).is_some() {
            return Err(AppError::InvalidRequest(format!(
                "Place '{}' is already part of this journey",
                replacement.id
            )));
        }

        self.stops[index] = JourneyStop::unvisited(replacement);
        Ok(())
    }

    /// Structural checks applied to journeys loaded from storage
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for stop in &self.stops {
            if !seen.insert(&stop.place.id) {
                return Err(format!("duplicate stop '{}'", stop.place.id));
            }
            if stop.coins_earned > 0 && (!stop.visited || stop.photos.is_empty()) {
                return Err(format!(
                    "stop '{}' earned coins without a photographed visit",
                    stop.place.id
                ));
            }
        }
        if self.completed && !self.stops.iter().all(|s| s.visited) {
            return Err("journey marked completed with unvisited stops".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn journey(ids: &[&str]) -> Journey {
        let places = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                Place::new(*id, format!("Stop {}", id), Coordinates {
                    lat: 18.78 + i as f64 * 0.01,
                    lng: 98.95,
                })
            })
            .collect();
        Journey::new(Route::new(places).unwrap(), Personality::Default, TripDuration::Custom)
    }

    fn photos(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("photo-{}.jpg", i)).collect()
    }

    #[test]
    fn test_new_journey_is_planned() {
        let j = journey(&["1", "2"]);
        assert_eq!(j.status(), JourneyStatus::Planned);
        assert_eq!(j.total_coins, 0);
        assert!(j.stops.iter().all(|s| !s.visited && s.coins_earned == 0));
    }

    #[test]
    fn test_visit_without_photos_does_not_count() {
        let mut j = journey(&["1", "2"]);
        let outcome = j.visit(&"1".into(), vec![], &CoinRules::default()).unwrap();

        assert_eq!(outcome.coins_earned, 0);
        assert!(!outcome.visited);
        assert!(!j.stops[0].visited);
        assert_eq!(j.status(), JourneyStatus::Planned);
    }

    #[test]
    fn test_photo_coins_scale_linearly() {
        let mut j = journey(&["1", "2"]);
        let outcome = j.visit(&"1".into(), photos(3), &CoinRules::default()).unwrap();

        assert_eq!(outcome.coins_earned, 30);
        assert_eq!(j.stops[0].coins_earned, 30);
        assert_eq!(j.stops[0].photos.len(), 3);
        assert!(j.stops[0].visited_at.is_some());
        assert_eq!(j.status(), JourneyStatus::InProgress);
    }

    #[test]
    fn test_oversized_coin_rules_saturate() {
        let rules = CoinRules {
            coins_per_photo: u32::MAX / 2 + 1,
            completion_bonus: 100,
            review_bonus: 0,
        };
        let mut j = journey(&["1", "2"]);
        let first = j.visit(&"1".into(), photos(2), &rules).unwrap();
        assert_eq!(first.coins_earned, u32::MAX);

        let second = j.visit(&"2".into(), photos(1), &rules).unwrap();
        assert!(second.journey_completed);
        assert_eq!(second.coins_earned, u32::MAX / 2 + 101);
        assert_eq!(j.total_coins, u32::MAX);
    }

    #[test]
    fn test_unknown_place_is_not_found() {
        let mut j = journey(&["1"]);
        let err = j.visit(&"99".into(), photos(1), &CoinRules::default()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_completion_bonus_awarded_once() {
        let rules = CoinRules::default();
        let mut j = journey(&["1"]);

        let first = j.visit(&"1".into(), photos(1), &rules).unwrap();
        assert_eq!(first.coins_earned, 110);
        assert_eq!(first.completion_bonus, 100);
        assert!(first.journey_completed);

        let again = j.visit(&"1".into(), photos(2), &rules).unwrap();
        assert_eq!(again.coins_earned, 0);
        assert_eq!(again.completion_bonus, 0);
        assert_eq!(j.total_coins, 110);
        assert_eq!(j.stops[0].photos.len(), 1);
    }

    #[test]
    fn test_substitute_keeps_other_progress() {
        let rules = CoinRules::default();
        let mut j = journey(&["1", "2", "3"]);
        j.visit(&"1".into(), photos(1), &rules).unwrap();

        let replacement = Place::new("9", "Replacement", Coordinates { lat: 18.9, lng: 98.9 });
        j.substitute_stop(&"2".into(), replacement).unwrap();

        assert_eq!(j.stops[1].place.id, PlaceId::new("9"));
        assert!(!j.stops[1].visited);
        assert!(j.stops[0].visited);
        assert_eq!(j.stops[2].place.id, PlaceId::new("3"));
    }

    #[test]
    fn test_substitute_rejects_visited_and_duplicates() {
        let rules = CoinRules::default();
        let mut j = journey(&["1", "2"]);
        j.visit(&"1".into(), photos(1), &rules).unwrap();

        let dup = j.stops[1].place.clone();
        assert!(matches!(
            j.substitute_stop(&"1".into(), Place::new("7", "x", dup.coordinates)),
            Err(AppError::InvalidRequest(_))
        ));

        let mut k = journey(&["1", "2"]);
        assert!(matches!(
            k.substitute_stop(&"1".into(), dup),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            k.substitute_stop(&"5".into(), Place::new("6", "y", Coordinates { lat: 0.0, lng: 0.0 })),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_validate_catches_coin_invariant() {
        let mut j = journey(&["1"]);
        assert!(j.validate().is_ok());

        j.stops[0].coins_earned = 10;
        assert!(j.validate().is_err());
    }

    #[test]
    fn test_journey_serde_roundtrip_keeps_progress() {
        let mut j = journey(&["1", "2"]);
        j.visit(&"2".into(), photos(1), &CoinRules::default()).unwrap();

        let value = serde_json::to_value(&j).unwrap();
        assert_eq!(value["stops"][1]["id"], "2");
        assert_eq!(value["stops"][1]["visited"], true);

        let back: Journey = serde_json::from_value(value).unwrap();
        assert_eq!(back.id, j.id);
        assert_eq!(back.total_coins, 10);
        assert_eq!(back.visited_ids(), j.visited_ids());
        assert_eq!(back.stops[1].photos, j.stops[1].photos);
    }
}
