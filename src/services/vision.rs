//! Vision-model obstacle detector over street-level imagery.
//!
//! # Data Flow
//! ```text
//! Coordinate
//!     → streetview.rs (image URL)
//!     → image download (bytes + MIME type)
//!     → generateContent on each configured model, in order
//!     → JSON list of obstacle labels
//! ```
//!
//! # Design Decisions
//! - The image is downloaded once per probe and reused across models
//! - The first model that answers with a parseable list wins
//! - Evidence references never carry the imagery API key

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::DetectionConfig;
use crate::geo::Coordinate;
use crate::services::streetview::StreetViewImagery;
use crate::services::types::{Detection, DetectionFailure, ObstacleDetector};

/// Obstacle labels the model is asked to report.
pub const OBSTACLE_LABELS: [&str; 5] = [
    "stairs",
    "steep_slope",
    "construction",
    "narrow_sidewalk",
    "pole_blocking_path",
];

const DEFAULT_MIME: &str = "image/jpeg";

fn prompt() -> String {
    let labels: String = OBSTACLE_LABELS.iter().map(|l| format!("- {}\n", l)).collect();
    format!(
        "Analyze this street view image for accessibility obstacles for a wheelchair user.\n\
         Identify if any of the following are present and clearly blocking the path:\n\
         {labels}\n\
         Return ONLY a JSON list of strings, e.g., [\"stairs\", \"construction\"].\n\
         If no obstacles are found, return [].\n\
         Do not include markdown formatting."
    )
}

/// Remove a surrounding markdown code fence, if any.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(fenced) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening line.
    let body = fenced.split_once('\n').map_or("", |(_, rest)| rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse the model's answer into normalized labels.
pub fn parse_obstacle_list(text: &str) -> Result<Vec<String>, DetectionFailure> {
    let labels: Vec<String> = serde_json::from_str(strip_fences(text))
        .map_err(|e| DetectionFailure::Decode(format!("{}: {:?}", e, text)))?;
    Ok(labels
        .into_iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Extract the first candidate's text from a `generateContent` response.
fn candidate_text(body: &Value) -> Option<String> {
    let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

struct Image {
    mime_type: String,
    data: String,
}

/// Detector backed by Street View imagery and a Gemini vision model.
pub struct VisionDetector {
    client: reqwest::Client,
    imagery: StreetViewImagery,
    base_url: String,
    api_key: String,
    models: Vec<String>,
}

impl VisionDetector {
    /// Build from config, reading both API keys from the environment.
    pub fn from_config(config: &DetectionConfig) -> Result<Self, DetectionFailure> {
        let maps_key = read_key(&config.maps_key_env)?;
        let vision_key = read_key(&config.vision_key_env)?;
        Self::new(config, maps_key, vision_key)
    }

    pub fn new(config: &DetectionConfig, maps_key: String, vision_key: String) -> Result<Self, DetectionFailure> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let imagery = StreetViewImagery::new(&config.street_view_url, &config.image_size, maps_key)?;

        Ok(Self {
            client,
            imagery,
            base_url: config.vision_base_url.trim_end_matches('/').to_string(),
            api_key: vision_key,
            models: config.models.clone(),
        })
    }

    async fn fetch_image(&self, at: Coordinate) -> Result<Image, DetectionFailure> {
        let response = self.client.get(self.imagery.image_url(at)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DetectionFailure::Service(format!(
                "imagery returned HTTP {}",
                status.as_u16()
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or(DEFAULT_MIME)
            .to_string();
        let bytes = response.bytes().await?;

        Ok(Image {
            mime_type,
            data: BASE64.encode(&bytes),
        })
    }

    async fn classify(&self, model: &str, image: &Image) -> Result<Vec<String>, DetectionFailure> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": prompt() },
                    { "inline_data": { "mime_type": image.mime_type, "data": image.data } },
                ]
            }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectionFailure::Service(format!(
                "model {} returned HTTP {}",
                model,
                status.as_u16()
            )));
        }

        let value: Value = response.json().await?;
        let text = candidate_text(&value)
            .ok_or_else(|| DetectionFailure::Decode(format!("model {} returned no text", model)))?;
        parse_obstacle_list(&text)
    }
}

impl ObstacleDetector for VisionDetector {
    async fn detect(&self, at: Coordinate) -> Result<Detection, DetectionFailure> {
        let image = self.fetch_image(at).await?;
        let evidence = Some(self.imagery.evidence_url(at).to_string());

        for model in &self.models {
            match self.classify(model, &image).await {
                Ok(labels) => {
                    tracing::trace!(model = %model, at = %at, labels = ?labels, "Image classified");
                    return Ok(Detection::with_types(labels, evidence));
                }
                Err(e) => {
                    tracing::debug!(model = %model, error = %e, "Vision model failed, trying next");
                }
            }
        }

        Err(DetectionFailure::Service(format!(
            "all {} vision models failed",
            self.models.len()
        )))
    }
}

impl std::fmt::Debug for VisionDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionDetector")
            .field("imagery", &self.imagery)
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .finish()
    }
}

fn read_key(var: &str) -> Result<String, DetectionFailure> {
    std::env::var(var)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| DetectionFailure::MissingApiKey(var.to_string()))
}
