use crate::config::PlannerConfig;
use crate::models::{Personality, Place, TripDuration};
use rand::seq::SliceRandom;
use rand::Rng;

use super::ranking::strategy_for;

/// Narrow `candidates` to at most the duration's stop cap.
///
/// Candidates are ranked for the personality. When the ranked list is longer
/// than the cap, the final stops are a uniform shuffle of the top
/// `cap * candidate_pool_multiplier` entries cut down to the cap, so repeated
/// calls favour the best places without always returning the same ones.
/// The result is unordered; sequencing happens afterwards.
pub fn select_places<R>(
    candidates: &[Place],
    personality: Personality,
    duration: TripDuration,
    config: &PlannerConfig,
    rng: &mut R,
) -> Vec<Place>
where
    R: Rng + ?Sized,
{
    let mut ranked = candidates.to_vec();
    let strategy = strategy_for(personality, config);
    strategy.rank(&mut ranked);

    let max_places = duration.max_stops(config).unwrap_or(ranked.len());
    if ranked.len() > max_places {
        let pool_size = (max_places * config.candidate_pool_multiplier).min(ranked.len());
        ranked.truncate(pool_size);
        ranked.shuffle(rng);
        ranked.truncate(max_places);
    }

    tracing::debug!(
        strategy = strategy.name(),
        candidates = candidates.len(),
        selected = ranked.len(),
        "Selected {} of {} candidates for {} / {}",
        ranked.len(),
        candidates.len(),
        personality,
        duration
    );

    ranked
}
