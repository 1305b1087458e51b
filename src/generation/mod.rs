//! Answer generation via a hosted language model.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::time::Duration;

/// Default timeout for API requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Trait for answer generation from a composed prompt.
///
/// Implementations wrap a model endpoint and apply retry/timeout policy.
/// Output quality is never evaluated at this layer.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Create an OpenAI client with the configured request timeout.
///
/// A bounded timeout prevents hung API calls from stalling requests
/// indefinitely; expiry surfaces as a transport error to the caller.
pub fn create_client(timeout: Option<Duration>) -> Client<OpenAIConfig> {
    let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}
