//! OpenAI chat-completions generator with retry on transient failures.

use super::{create_client, Generator};
use crate::config::{GenerationSettings, QaPrompts};
use crate::error::{Result, SvarError};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// OpenAI-backed generator.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_retries: u32,
    system_prompt: String,
}

impl OpenAIGenerator {
    /// Create a generator from the generation settings.
    pub fn new(settings: &GenerationSettings, prompts: &QaPrompts) -> Self {
        let timeout = settings.timeout_seconds.map(Duration::from_secs);
        Self {
            client: create_client(timeout),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_retries: settings.max_retries,
            system_prompt: prompts.system.clone(),
        }
    }

    fn build_request(
        &self,
        prompt: &str,
    ) -> Result<async_openai::types::CreateChatCompletionRequest> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| SvarError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| SvarError::Generation(e.to_string()))?
                .into(),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            args.max_tokens(max_tokens);
        }

        args.build().map_err(|e| SvarError::Generation(e.to_string()))
    }
}

/// Whether a failed call is worth retrying.
///
/// Transport errors (including timeouts) and rate-limit or server-side API
/// errors are transient; invalid credentials or malformed requests are not.
fn is_transient(err: &OpenAIError) -> bool {
    match err {
        OpenAIError::Reqwest(_) => true,
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.as_deref().unwrap_or("");
            kind.contains("rate_limit")
                || kind.contains("server_error")
                || kind.contains("overloaded")
        }
        _ => false,
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt)?;

        let mut attempt = 0;
        let response = loop {
            match self.client.chat().create(request.clone()).await {
                Ok(response) => break response,
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = Duration::from_millis(500u64 * (1u64 << attempt.min(6)));
                    warn!(
                        "Transient generation error (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.max_retries, backoff, e
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    return Err(SvarError::Generation(format!(
                        "Chat completion failed after {} attempt(s): {}",
                        attempt + 1,
                        e
                    )));
                }
            }
        };

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SvarError::Generation("Empty response from LLM".to_string()))?
            .trim()
            .to_string();

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    #[test]
    fn test_rate_limit_errors_are_transient() {
        let err = OpenAIError::ApiError(ApiError {
            message: "slow down".to_string(),
            r#type: Some("rate_limit_exceeded".to_string()),
            param: None,
            code: None,
        });
        assert!(is_transient(&err));
    }

    #[test]
    fn test_invalid_request_errors_are_not_transient() {
        let err = OpenAIError::ApiError(ApiError {
            message: "bad key".to_string(),
            r#type: Some("invalid_request_error".to_string()),
            param: None,
            code: None,
        });
        assert!(!is_transient(&err));

        assert!(!is_transient(&OpenAIError::InvalidArgument("nope".to_string())));
    }

    #[test]
    fn test_request_includes_configured_parameters() {
        let settings = GenerationSettings {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: Some(256),
            timeout_seconds: None,
            max_retries: 1,
        };
        let generator = OpenAIGenerator::new(&settings, &QaPrompts::default());
        let request = generator.build_request("hello").unwrap();

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.messages.len(), 2);
    }
}
