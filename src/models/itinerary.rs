use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    #[default]
    Main,
    Restaurant,
    Cafe,
    Market,
    Shop,
    Attraction,
    Nightlife,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Start time as "HH:MM"
    pub time: String,
    pub place_id: String,
    pub place_name: String,
    pub duration: String,
    pub description: String,
    #[serde(default)]
    pub tips: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_to_next: Option<String>,
    #[serde(default)]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub is_nearby_recommendation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayItinerary {
    pub day: u32,
    pub title: String,
    pub activities: Vec<Activity>,
}

/// Day-by-day narrative plan for a route. The field layout is the JSON the
/// generative provider is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub trip_name: String,
    pub total_days: u32,
    pub personality: String,
    pub summary: String,
    pub days: Vec<DayItinerary>,
    #[serde(default)]
    pub packing_tips: Vec<String>,
    #[serde(default)]
    pub budget_estimate: String,
    /// Set when the itinerary was templated locally instead of generated
    #[serde(default)]
    pub is_offline: bool,
}

impl Itinerary {
    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|d| d.activities.len()).sum()
    }
}
