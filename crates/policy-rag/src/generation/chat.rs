//! Single-turn streamed chat with no retrieval

use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::providers::GenerationProvider;
use crate::types::{ChatMessage, ChatTurn, GenerationOptions, GenerationRequest};

use super::stream::TextStream;

const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;
const MAX_TOKENS_LIMIT: u32 = 4000;

/// Validates a chat turn and streams the completion
pub struct ChatPipeline {
    generator: Arc<dyn GenerationProvider>,
    config: GenerationConfig,
}

impl ChatPipeline {
    pub fn new(generator: Arc<dyn GenerationProvider>, config: GenerationConfig) -> Self {
        Self { generator, config }
    }

    /// Defaults applied when a turn carries no options
    pub fn default_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Reject a turn that must not reach the provider
    pub fn validate(&self, turn: &ChatTurn) -> Result<()> {
        self.check_message("developer_message", &turn.developer_instruction)?;
        self.check_message("user_message", &turn.user_text)?;

        if !self.config.allowed_models.iter().any(|m| m == &turn.model_id) {
            return Err(Error::invalid(format!(
                "Model must be one of: {}",
                self.config.allowed_models.join(", ")
            )));
        }

        let key = turn.provider_key.trim();
        if key.is_empty() {
            return Err(Error::invalid("API key is required"));
        }
        if let Some(prefix) = &self.config.required_key_prefix {
            if !key.starts_with(prefix.as_str()) {
                return Err(Error::invalid(format!(
                    "Invalid API key format (expected prefix '{}')",
                    prefix
                )));
            }
        }

        if let Some(options) = &turn.options {
            if !TEMPERATURE_RANGE.contains(&options.temperature) {
                return Err(Error::invalid("temperature must be between 0 and 2"));
            }
            if options.max_tokens == 0 || options.max_tokens > MAX_TOKENS_LIMIT {
                return Err(Error::invalid(format!(
                    "max_tokens must be between 1 and {}",
                    MAX_TOKENS_LIMIT
                )));
            }
        }

        Ok(())
    }

    fn check_message(&self, field: &str, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::invalid(format!("{} cannot be empty", field)));
        }
        let chars = text.chars().count();
        if chars > self.config.max_message_chars {
            return Err(Error::invalid(format!(
                "{} is too long ({} characters, max {})",
                field, chars, self.config.max_message_chars
            )));
        }
        Ok(())
    }

    /// Stream a reply to `[system: instruction, user: text]`
    pub async fn chat(&self, turn: ChatTurn) -> Result<TextStream> {
        self.validate(&turn)?;

        let options = turn.options.unwrap_or_else(|| self.default_options());
        let request = GenerationRequest {
            messages: vec![
                ChatMessage::system(turn.developer_instruction.trim()),
                ChatMessage::user(turn.user_text.trim()),
            ],
            model_id: turn.model_id,
            provider_key: turn.provider_key.trim().to_string(),
            options,
        };

        tracing::info!(
            "Chat request to {} (model {}, temperature {}, max_tokens {})",
            self.generator.name(),
            request.model_id,
            options.temperature,
            options.max_tokens
        );

        let stream = self.generator.generate(request).await.map_err(|e| {
            tracing::warn!("Chat generation failed to start: {}", e);
            e
        })?;

        stream.primed().await
    }
}
