pub mod catalog;
pub mod gemini;
pub mod itinerary_service;
pub mod journey_service;
pub mod review_service;
pub mod user_service;
