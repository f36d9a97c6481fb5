use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a place in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub String);

impl PlaceId {
    pub fn new(id: impl Into<String>) -> Self {
        PlaceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(s: &str) -> Self {
        PlaceId(s.to_string())
    }
}

/// A point of interest. Reference data: the planner never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Star rating from 0.0 to 5.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: String,
}

impl Place {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinates: Coordinates) -> Self {
        Place {
            id: PlaceId::new(id),
            name: name.into(),
            coordinates,
            description: None,
            rating: None,
            tags: Vec::new(),
            image: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating.clamp(0.0, 5.0));
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Missing ratings rank as zero
    pub fn rating_or_zero(&self) -> f32 {
        self.rating.unwrap_or(0.0)
    }

    /// Great-circle distance to another place in kilometers
    pub fn distance_to(&self, other: &Place) -> f64 {
        self.coordinates.distance_to(&other.coordinates)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Case-insensitive match of any keyword against name or description
    pub fn mentions_any(&self, keywords: &[String]) -> bool {
        let name = self.name.to_lowercase();
        let description = self
            .description
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        keywords
            .iter()
            .any(|k| name.contains(k.as_str()) || description.contains(k.as_str()))
    }
}
