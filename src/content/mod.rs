//! Generated landmark content: travel guide text, history timeline, imagery
//!
//! `ContentBackend` is the seam to the generative model. The free functions
//! below wrap each backend call in its static fallback so callers never see a
//! failure, only degraded content.

pub mod gemini;

use crate::error::BackendError;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiClient;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttractionDetails {
    pub description: String,
    pub things_to_do: Vec<String>,
    pub best_time_to_visit: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryEvent {
    pub year: String,
    pub title: String,
    pub description: String,
}

impl HistoryEvent {
    /// Memoization key for the historical image of this event
    pub fn cache_key(&self) -> String {
        format!("{}{}", self.year, self.title)
    }
}

/// Decoded image payload as returned by the image model
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Generative content source. Implementations make exactly one attempt per
/// call and report failures as `BackendError`.
pub trait ContentBackend: Send + Sync {
    fn attraction_details(&self, name: &str, country: &str) -> Result<AttractionDetails, BackendError>;

    fn landmark_history(&self, name: &str, country: &str) -> Result<Vec<HistoryEvent>, BackendError>;

    fn attraction_image(&self, name: &str, country: &str) -> Result<GeneratedImage, BackendError>;

    fn historical_image(
        &self,
        name: &str,
        country: &str,
        event: &HistoryEvent,
    ) -> Result<GeneratedImage, BackendError>;
}

pub fn fallback_details(name: &str) -> AttractionDetails {
    AttractionDetails {
        description: format!(
            "Explore the wonders of {}. Information is currently unavailable, but it is definitely worth a visit!",
            name
        ),
        things_to_do: vec![
            "Sightseeing".to_string(),
            "Photography".to_string(),
            "Local Cuisine".to_string(),
        ],
        best_time_to_visit: "Any time of year".to_string(),
    }
}

pub fn fallback_history() -> Vec<HistoryEvent> {
    vec![HistoryEvent {
        year: "N/A".to_string(),
        title: "History Unavailable".to_string(),
        description: "Could not load historical data at this time.".to_string(),
    }]
}

pub fn fetch_attraction_details(backend: &dyn ContentBackend, name: &str, country: &str) -> AttractionDetails {
    match backend.attraction_details(name, country) {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!(landmark = name, error = %e, "attraction details unavailable, using fallback");
            fallback_details(name)
        }
    }
}

pub fn fetch_landmark_history(backend: &dyn ContentBackend, name: &str, country: &str) -> Vec<HistoryEvent> {
    match backend.landmark_history(name, country) {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!(landmark = name, error = %e, "history unavailable, using sentinel event");
            fallback_history()
        }
    }
}

pub fn generate_attraction_image(backend: &dyn ContentBackend, name: &str, country: &str) -> Option<GeneratedImage> {
    match backend.attraction_image(name, country) {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!(landmark = name, error = %e, "modern image generation failed");
            None
        }
    }
}

pub fn generate_historical_image(
    backend: &dyn ContentBackend,
    name: &str,
    country: &str,
    event: &HistoryEvent,
) -> Option<GeneratedImage> {
    match backend.historical_image(name, country, event) {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!(landmark = name, year = %event.year, error = %e, "historical image generation failed");
            None
        }
    }
}
