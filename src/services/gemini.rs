use crate::config::ItineraryConfig;
use crate::models::Itinerary;
use crate::services::itinerary_service::{ItineraryProvider, ItineraryRequest, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are LonQ AI, an expert travel planner specializing in Chiang Mai, Thailand.
You create personalized travel itineraries based on user preferences.
Always respond with valid JSON only, no markdown or extra text.
All text content must be in English and kept short.

Travel styles:
- introvert: peaceful, less crowded places, temples, nature spots
- extrovert: social spots, markets, popular attractions, restaurants
- adventure: outdoor activities, hiking, water activities
- default: a balanced mix

Between the selected places, insert real nearby restaurants, cafes and markets as full
activities with isNearbyRecommendation: true and a placeId such as \"nearby-lunch-1\".
Selected places keep their given id with isNearbyRecommendation: false.
Keep the order of the selected places; it is already optimized for travel distance.";

/// Google Generative Language API client (`models/{model}:generateContent`)
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    models: Vec<String>,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String, config: &ItineraryConfig) -> Self {
        GeminiClient {
            client: Client::new(),
            api_key,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            models: config.gemini_models.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// `None` when no API key is configured
    pub fn from_config(config: &ItineraryConfig) -> Option<Self> {
        config
            .gemini_api_key
            .clone()
            .map(|key| Self::new(key, config))
    }
}

#[derive(Serialize)]
struct PromptPlace<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    rating: f32,
    tags: &'a [String],
    lat: f64,
    long: f64,
}

pub(crate) fn user_prompt(request: &ItineraryRequest<'_>) -> String {
    let places: Vec<PromptPlace> = request
        .route
        .places()
        .iter()
        .map(|p| PromptPlace {
            id: p.id.as_str(),
            name: &p.name,
            description: p.description.as_deref().unwrap_or_default(),
            rating: p.rating_or_zero(),
            tags: &p.tags,
            lat: p.coordinates.lat,
            long: p.coordinates.lng,
        })
        .collect();
    let places_json = serde_json::to_string_pretty(&places).unwrap_or_else(|_| "[]".to_string());

    let preferences = if request.preferences.is_empty() {
        String::new()
    } else {
        format!("Additional Preferences: {}\n", request.preferences.join(", "))
    };

    format!(
        "Create a travel itinerary for a Chiang Mai trip.

Selected Places (in visiting order):
{places_json}

Travel Style: {personality}
Duration: {days} day(s)
{preferences}
Respond with JSON of this exact structure:
{{
  \"tripName\": \"short creative trip name\",
  \"totalDays\": {days},
  \"personality\": \"{personality}\",
  \"summary\": \"one sentence\",
  \"days\": [{{\"day\": 1, \"title\": \"short theme\", \"activities\": [{{
    \"time\": \"HH:MM\", \"placeId\": \"id\", \"placeName\": \"name\", \"duration\": \"2 hrs\",
    \"description\": \"one sentence\", \"tips\": \"short tip\", \"transportToNext\": \"optional\",
    \"activityType\": \"main|restaurant|cafe|market|shop|attraction|nightlife\",
    \"isNearbyRecommendation\": false
  }}]}}],
  \"packingTips\": [\"tip\"],
  \"budgetEstimate\": \"range in THB\"
}}",
        personality = request.personality,
        days = request.duration.itinerary_days(),
    )
}

/// Models often wrap JSON in a markdown fence despite being told not to
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn is_overloaded(status: StatusCode, body: &str) -> bool {
    status == StatusCode::SERVICE_UNAVAILABLE
        || status == StatusCode::TOO_MANY_REQUESTS
        || body.contains("overloaded")
        || body.contains("UNAVAILABLE")
}

pub(crate) fn parse_itinerary(text: &str) -> Result<Itinerary, ProviderError> {
    let mut itinerary: Itinerary = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| ProviderError::Failed(format!("Invalid itinerary JSON: {}", e)))?;
    if itinerary.days.is_empty() {
        return Err(ProviderError::Failed("Itinerary has no days".to_string()));
    }
    itinerary.is_offline = false;
    Ok(itinerary)
}

#[async_trait]
impl ItineraryProvider for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &ItineraryRequest<'_>,
    ) -> Result<Itinerary, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
            "contents": [{ "role": "user", "parts": [{ "text": user_prompt(request) }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        tracing::debug!(
            model = model,
            stops = request.route.len(),
            "Gemini request with {} stops",
            request.route.len()
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Overloaded(format!("Request timed out: {}", e))
                } else {
                    ProviderError::Failed(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, model = model, "Gemini HTTP error {}: {}", status, error_text);
            let message = format!("HTTP {}: {}", status, error_text);
            return Err(if is_overloaded(status, &error_text) {
                ProviderError::Overloaded(message)
            } else {
                ProviderError::Failed(message)
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Failed(format!("Failed to parse response: {}", e)))?;
        let text = parsed
            .text()
            .ok_or_else(|| ProviderError::Failed("Empty response".to_string()))?;

        parse_itinerary(&text)
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
