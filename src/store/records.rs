//! Conversions between raw store documents and domain types.
//!
//! Place documents use the catalog layout of the mini app (`lat`/`long`,
//! numeric or string ids). User and journey documents are written by this
//! crate and are parsed strictly.

use crate::error::{AppError, Result};
use crate::models::{Coordinates, Journey, Place, PlaceId, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Place document as stored in the `places` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: Value,
    pub name: String,
    pub lat: f64,
    #[serde(alias = "lng")]
    pub long: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: String,
}

impl TryFrom<PlaceRecord> for Place {
    type Error = AppError;

    fn try_from(record: PlaceRecord) -> Result<Self> {
        let id = match &record.id {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(AppError::InvalidRequest(format!(
                    "Place '{}' has an invalid id: {}",
                    record.name, other
                )))
            }
        };

        if record.name.trim().is_empty() {
            return Err(AppError::InvalidRequest(format!("Place '{}' has no name", id)));
        }

        let coordinates = Coordinates::new(record.lat, record.long)
            .map_err(|e| AppError::InvalidRequest(format!("Place '{}': {}", id, e)))?;

        let rating = match record.rating {
            Some(r) if !(0.0..=5.0).contains(&r) => {
                tracing::warn!("Rating {} out of range for place '{}', ignoring", r, record.name);
                None
            }
            other => other,
        };

        Ok(Place {
            id: PlaceId(id),
            name: record.name,
            coordinates,
            description: record.description.filter(|d| !d.is_empty()),
            rating,
            tags: record.tags,
            image: record.image,
        })
    }
}

impl From<&Place> for PlaceRecord {
    fn from(place: &Place) -> Self {
        PlaceRecord {
            id: Value::String(place.id.0.clone()),
            name: place.name.clone(),
            lat: place.coordinates.lat,
            long: place.coordinates.lng,
            description: place.description.clone(),
            rating: place.rating,
            tags: place.tags.clone(),
            image: place.image.clone(),
        }
    }
}

/// Parse a place document, `InvalidRequest` when a field fails validation
pub fn parse_place(document: Value) -> Result<Place> {
    let record: PlaceRecord = serde_json::from_value(document)
        .map_err(|e| AppError::InvalidRequest(format!("Malformed place document: {}", e)))?;
    Place::try_from(record)
}

/// Parse a catalog listing, skipping documents that fail validation
pub fn parse_places(documents: Vec<Value>) -> Vec<Place> {
    documents
        .into_iter()
        .filter_map(|doc| match parse_place(doc) {
            Ok(place) => Some(place),
            Err(e) => {
                tracing::warn!("Skipping invalid place document: {}", e);
                None
            }
        })
        .collect()
}

pub fn place_document(place: &Place) -> Result<Value> {
    Ok(serde_json::to_value(PlaceRecord::from(place))?)
}

/// Stored user documents must parse; a broken profile is a store fault
pub fn parse_user(document: Value) -> Result<UserProfile> {
    let user: UserProfile = serde_json::from_value(document)
        .map_err(|e| AppError::Store(format!("Malformed user document: {}", e)))?;
    if user.user_id.is_empty() {
        return Err(AppError::Store("User document without userId".to_string()));
    }
    Ok(user)
}

pub fn parse_journey(document: Value) -> Result<Journey> {
    let journey: Journey = serde_json::from_value(document)
        .map_err(|e| AppError::Store(format!("Malformed journey document: {}", e)))?;
    journey
        .validate()
        .map_err(|e| AppError::Store(format!("Invalid journey {}: {}", journey.id, e)))?;
    Ok(journey)
}
