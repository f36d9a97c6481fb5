use crate::config::PlannerConfig;
use crate::models::{Personality, Place};

/// Orders candidate places best-first before the stop cap is applied.
/// Implementations must sort stably so equally ranked places keep their
/// catalog order.
pub trait RankingStrategy: Send + Sync {
    fn rank(&self, places: &mut [Place]);

    fn name(&self) -> &'static str;
}

/// Places mentioning a quiet-spot keyword in their name or description come
/// first; nothing else changes order
pub struct KeywordStrategy {
    keywords: Vec<String>,
}

impl KeywordStrategy {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl RankingStrategy for KeywordStrategy {
    fn rank(&self, places: &mut [Place]) {
        // false < true, so matching places (key false) sort first
        places.sort_by_key(|p| !p.mentions_any(&self.keywords));
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Highest star rating first, missing ratings treated as zero
pub struct RatingStrategy;

impl RankingStrategy for RatingStrategy {
    fn rank(&self, places: &mut [Place]) {
        places.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()));
    }

    fn name(&self) -> &'static str {
        "rating"
    }
}

pub fn strategy_for(personality: Personality, config: &PlannerConfig) -> Box<dyn RankingStrategy> {
    match personality {
        Personality::Introvert => Box::new(KeywordStrategy::new(config.introvert_keywords.clone())),
        Personality::Extrovert | Personality::Adventure | Personality::Default => {
            Box::new(RatingStrategy)
        }
    }
}
