use crate::config::PlannerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Travel style used to bias place selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Introvert,
    Extrovert,
    Adventure,
    #[default]
    Default,
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Personality::Introvert => "introvert",
            Personality::Extrovert => "extrovert",
            Personality::Adventure => "adventure",
            Personality::Default => "default",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let key = normalized.strip_suffix(" mode").unwrap_or(&normalized);
        match key {
            "introvert" => Ok(Personality::Introvert),
            "extrovert" => Ok(Personality::Extrovert),
            "adventure" => Ok(Personality::Adventure),
            "" | "default" | "custom" => Ok(Personality::Default),
            _ => Err(format!("Invalid personality: '{}'", s)),
        }
    }
}

/// Trip-length category that bounds route size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TripDuration {
    /// One day, no overnight stay
    DayTrip,
    /// Two days, one night
    OneNight,
    /// Three days, two nights. Not capped, but planned over three days.
    TwoNights,
    #[default]
    Custom,
}

impl TripDuration {
    /// Stop cap for this duration; `None` keeps every candidate
    pub fn max_stops(&self, config: &PlannerConfig) -> Option<usize> {
        match self {
            TripDuration::DayTrip => Some(config.day_trip_max_stops),
            TripDuration::OneNight => Some(config.one_night_max_stops),
            TripDuration::TwoNights | TripDuration::Custom => None,
        }
    }

    /// Number of days an itinerary is spread over
    pub fn itinerary_days(&self) -> usize {
        match self {
            TripDuration::DayTrip => 1,
            TripDuration::OneNight => 2,
            TripDuration::TwoNights => 3,
            TripDuration::Custom => 1,
        }
    }
}

impl fmt::Display for TripDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TripDuration::DayTrip => "day-trip",
            TripDuration::OneNight => "one-night",
            TripDuration::TwoNights => "two-nights",
            TripDuration::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TripDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day-trip" | "daytrip" | "1 วัน ไม่ค้างคืน" => Ok(TripDuration::DayTrip),
            "one-night" | "2 วัน 1 คืน" => Ok(TripDuration::OneNight),
            "two-nights" | "3 วัน 2 คืน" => Ok(TripDuration::TwoNights),
            "" | "custom" => Ok(TripDuration::Custom),
            _ => Err(format!("Invalid trip duration: '{}'", s)),
        }
    }
}
