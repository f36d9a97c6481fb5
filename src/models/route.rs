use crate::error::{AppError, Result};
use crate::models::{Place, PlaceId};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;

/// Ordered visiting sequence of places. Insertion order is visiting order and
/// place ids are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(transparent)]
pub struct Route {
    places: Vec<Place>,
}

/// One map marker: position plus 1-based stop number
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteMarker {
    pub lat: f64,
    pub lng: f64,
    pub sequence: usize,
}

impl Route {
    pub fn new(places: Vec<Place>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(places.len());
        for place in &places {
            if !seen.insert(&place.id) {
                return Err(AppError::InvalidRequest(format!(
                    "Place '{}' appears more than once in the route",
                    place.id
                )));
            }
        }
        Ok(Route { places })
    }

    /// For callers that already guarantee unique ids
    pub(crate) fn from_unique(places: Vec<Place>) -> Self {
        debug_assert!(Route::new(places.clone()).is_ok());
        Route { places }
    }

    pub fn empty() -> Self {
        Route::default()
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn into_places(self) -> Vec<Place> {
        self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn ids(&self) -> Vec<&PlaceId> {
        self.places.iter().map(|p| &p.id).collect()
    }

    pub fn contains(&self, id: &PlaceId) -> bool {
        self.places.iter().any(|p| &p.id == id)
    }

    pub fn position_of(&self, id: &PlaceId) -> Option<usize> {
        self.places.iter().position(|p| &p.id == id)
    }

    /// Distance from each stop to the next one, in kilometers
    pub fn legs(&self) -> Vec<f64> {
        self.places
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .collect()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.legs().iter().sum()
    }

    pub fn markers(&self) -> Vec<RouteMarker> {
        self.places
            .iter()
            .enumerate()
            .map(|(idx, place)| RouteMarker {
                lat: place.coordinates.lat,
                lng: place.coordinates.lng,
                sequence: idx + 1,
            })
            .collect()
    }

    /// Numbered stop markers followed by the path as a LineString
    pub fn to_geojson(&self) -> FeatureCollection {
        let mut features: Vec<Feature> = self
            .places
            .iter()
            .zip(self.markers())
            .map(|(place, marker)| {
                let mut properties = JsonObject::new();
                properties.insert("sequence".to_string(), json!(marker.sequence));
                properties.insert("place_id".to_string(), json!(place.id));
                properties.insert("name".to_string(), json!(place.name));
                feature(GeoValue::Point(vec![marker.lng, marker.lat]), properties)
            })
            .collect();

        if self.places.len() >= 2 {
            let path = self
                .places
                .iter()
                .map(|p| vec![p.coordinates.lng, p.coordinates.lat])
                .collect();
            let mut properties = JsonObject::new();
            properties.insert("distance_km".to_string(), json!(self.total_distance_km()));
            features.push(feature(GeoValue::LineString(path), properties));
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Replace the entry at `index`, keeping every other position intact
    pub(crate) fn replace_at(&mut self, index: usize, place: Place) {
        self.places[index] = place;
    }
}

fn feature(value: GeoValue, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
