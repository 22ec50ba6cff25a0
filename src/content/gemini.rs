//! Gemini `generateContent` client over blocking HTTP
//!
//! Text calls request JSON output constrained by a response schema; image
//! calls return the first `inlineData` part of the first candidate.

use super::{AttractionDetails, ContentBackend, GeneratedImage, HistoryEvent};
use crate::error::BackendError;
use crate::settings::GeminiSettings;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.parts().filter_map(|p| p.text.as_deref()).collect()
    }

    fn first_image(&self) -> Result<GeneratedImage, BackendError> {
        let inline = self
            .parts()
            .find_map(|p| p.inline_data.as_ref())
            .ok_or(BackendError::Empty)?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(inline.data.trim())?;
        Ok(GeneratedImage {
            bytes,
            mime_type: inline.mime_type.clone(),
        })
    }
}

pub struct GeminiClient {
    agent: ureq::Agent,
    api_key: Option<String>,
    endpoint: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings, api_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build();

        Self {
            agent,
            api_key,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            text_model: settings.text_model.clone(),
            image_model: settings.image_model.clone(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate(&self, model: &str, body: Value) -> Result<GenerateResponse, BackendError> {
        let key = self.api_key.as_deref().ok_or(BackendError::MissingApiKey)?;
        let url = format!("{}/models/{}:generateContent", self.endpoint, urlencoding::encode(model));

        tracing::debug!(model, "generateContent request");
        let response = self
            .agent
            .post(&url)
            .set("x-goog-api-key", key)
            .send_json(body)?;

        let text = response.into_string()?;
        Ok(serde_json::from_str(&text)?)
    }

    fn generate_json(&self, prompt: &str, schema: Value) -> Result<String, BackendError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });
        Ok(self.generate(&self.text_model, body)?.text())
    }

    fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, BackendError> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        self.generate(&self.image_model, body)?.first_image()
    }
}

impl ContentBackend for GeminiClient {
    fn attraction_details(&self, name: &str, country: &str) -> Result<AttractionDetails, BackendError> {
        let text = self.generate_json(&details_prompt(name, country), details_schema())?;
        if text.trim().is_empty() {
            return Err(BackendError::Empty);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn landmark_history(&self, name: &str, country: &str) -> Result<Vec<HistoryEvent>, BackendError> {
        let text = self.generate_json(&history_prompt(name, country), history_schema())?;
        // An empty answer is an empty timeline, not a failure
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn attraction_image(&self, name: &str, country: &str) -> Result<GeneratedImage, BackendError> {
        self.generate_image(&modern_image_prompt(name, country))
    }

    fn historical_image(
        &self,
        name: &str,
        country: &str,
        event: &HistoryEvent,
    ) -> Result<GeneratedImage, BackendError> {
        self.generate_image(&historical_image_prompt(name, country, event))
    }
}

fn details_prompt(name: &str, country: &str) -> String {
    format!(
        "Provide a travel guide summary for {name} in {country}. Include a brief engaging description, \
         a list of 3-5 unique things to do there, and the best time of year to visit."
    )
}

fn history_prompt(name: &str, country: &str) -> String {
    format!(
        "Generate a historical timeline for {name} in {country}. Identify 4 to 5 major historical events, \
         eras, or construction phases associated with this location. For each event, provide the approximate \
         year (or era), a short title, and a 1-sentence description. \
         Return a JSON array of objects with keys: year, title, description."
    )
}

fn modern_image_prompt(name: &str, country: &str) -> String {
    format!(
        "A high quality, photorealistic, cinematic wide shot of {name} in {country}. \
         Beautiful lighting, travel photography style."
    )
}

fn historical_image_prompt(name: &str, country: &str, event: &HistoryEvent) -> String {
    format!(
        "A photorealistic historical visualization of {name} in {country} during the year/era: {} ({}). \
         The image should reflect the architecture, environment, and atmosphere of that specific time period. \
         If the landmark wasn't built yet, show the landscape or city as it was. \
         Cinematic, detailed, historical accuracy.",
        event.year, event.title
    )
}

fn details_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "description": { "type": "STRING" },
            "thingsToDo": { "type": "ARRAY", "items": { "type": "STRING" } },
            "bestTimeToVisit": { "type": "STRING" }
        },
        "required": ["description", "thingsToDo", "bestTimeToVisit"]
    })
}

fn history_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "year": { "type": "STRING" },
                "title": { "type": "STRING" },
                "description": { "type": "STRING" }
            },
            "required": ["year", "title", "description"]
        }
    })
}
