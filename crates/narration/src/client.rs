//! Generative Language API Client

use crate::{NarrationError, NarrationProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Narration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// API key; narration is disabled without one
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Base URL of the API
    pub endpoint: String,
    /// Deadline for a single narration (seconds)
    pub timeout_secs: u64,
    /// Location named in prompts
    pub location: String,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemma-3-4b-it".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 10,
            location: "Stasiun Meteorologi Citeko, Kabupaten Bogor".to_string(),
        }
    }
}

impl NarrationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Client for the `generateContent` endpoint
pub struct GeminiClient {
    config: NarrationConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a client; fails only if the HTTP client cannot be built
    pub fn new(config: NarrationConfig) -> Result<Self, NarrationError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| NarrationError::Request(e.to_string()))?;

        if config.api_key.is_some() {
            info!("Narration enabled with model {}", config.model);
        } else {
            warn!("No narration API key configured; explanations disabled");
        }

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &NarrationConfig {
        &self.config
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl NarrationProvider for GeminiClient {
    fn is_available(&self) -> bool {
        self.config.api_key.as_deref().map_or(false, |k| !k.is_empty())
    }

    async fn generate(&self, prompt: &str) -> Result<String, NarrationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(NarrationError::Unavailable)?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!("Requesting narration from {}", self.url());
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NarrationError::Timeout(self.config.timeout().as_millis() as u64)
                } else {
                    NarrationError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| NarrationError::Request(e.to_string()))?;

        parsed.into_text().ok_or(NarrationError::EmptyResponse)
    }
}
