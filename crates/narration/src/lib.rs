//! Forecast Narration
//!
//! Turns numeric forecasts into short explanations using an external
//! text-generation service. Every failure here is non-fatal to the caller.

mod client;
mod prompt;

pub use client::{GeminiClient, NarrationConfig};
pub use prompt::{comparison_prompt, single_prompt, ForecastSummary, PromptContext};

use async_trait::async_trait;
use thiserror::Error;

/// Narration error types
#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("Narration provider not configured")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Timed out after {0}ms")]
    Timeout(u64),
}

/// External text generator
#[async_trait]
pub trait NarrationProvider: Send + Sync {
    /// Whether the provider can be called at all
    fn is_available(&self) -> bool;

    /// Generate text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, NarrationError>;
}
