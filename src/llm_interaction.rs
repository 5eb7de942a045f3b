use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::constants;
use crate::errors::TrackerError;

/// Something that can estimate nutrition for a food and amount.
///
/// Implementations return the raw reply; parsing is the caller's job.
#[async_trait]
pub trait NutritionEstimator {
    async fn estimate(&self, food: &str, amount: &str) -> Result<String, TrackerError>;
}

// Structures matching Ollama's /api/generate endpoint
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool, // We want the full response, not a stream
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String, // The generated text
    // Other fields like model, created_at, timings, etc., are ignored
}

/// Instruction asking for exactly four numbers: proteins, carbs, fat, calories.
pub fn build_nutrition_prompt(food: &str, amount: &str) -> String {
    let eaten = if amount.is_empty() {
        food.to_string()
    } else {
        format!("{} of {}", amount, food)
    };
    format!(
        "You are a calorie tracking application. Your user ate {}. \
        How many grams of protein, grams of carbs, grams of fat and how many total calories did it have? \
        Reply with exactly 4 numbers separated by spaces, in this order: proteins carbs fat calories. \
        Do not include units, labels or any other text.",
        eaten
    )
}

/// Client for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, TrackerError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::CollaboratorUnavailable {
                endpoint: base_url.clone(),
                reason: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Client configured from `OLLAMA_URL`, `CALORIE_TRACKER_MODEL` and the LLM timeout.
    pub fn from_env() -> Result<Self, TrackerError> {
        Self::new(
            constants::OLLAMA_URL.clone(),
            constants::NUTRITION_MODEL.clone(),
            Duration::from_secs(*constants::LLM_TIMEOUT_SECS),
        )
    }

    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: String) -> Result<String, TrackerError> {
        let ollama_api_url = self.generate_url();
        let unavailable = |reason: String| TrackerError::CollaboratorUnavailable {
            endpoint: ollama_api_url.clone(),
            reason,
        };

        debug!(%prompt, "Constructed Ollama prompt for nutrition estimate");

        let request_payload = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&ollama_api_url)
            .json(&request_payload)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    e.to_string()
                };
                error!(%reason, "Ollama request failed");
                unavailable(reason)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %error_body, "Ollama API request failed");
            return Err(unavailable(format!("status {}: {}", status, error_body)));
        }

        let body = response.text().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else {
                format!("failed to read response body: {}", e)
            };
            unavailable(reason)
        })?;

        let ollama_response: OllamaResponse =
            serde_json::from_str(&body).map_err(|e| TrackerError::MalformedNutritionResponse {
                description: format!("model {}", self.model),
                reply: body.clone(),
                reason: format!("unexpected Ollama response body: {}", e),
            })?;

        debug!(response = ?ollama_response.response, "Received Ollama response");
        Ok(ollama_response.response.trim().to_string())
    }
}

#[async_trait]
impl NutritionEstimator for OllamaClient {
    async fn estimate(&self, food: &str, amount: &str) -> Result<String, TrackerError> {
        self.generate(build_nutrition_prompt(food, amount)).await
    }
}
