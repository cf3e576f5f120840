//! Grounded answer synthesis over retrieved passages

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::GenerationProvider;
use crate::types::{ChatMessage, GenerationOptions, GenerationRequest};

use super::prompt::PromptBuilder;
use super::stream::TextStream;

/// Streams an answer to a question, constrained to the supplied passages
pub struct AnswerSynthesizer {
    generator: Arc<dyn GenerationProvider>,
    options: GenerationOptions,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn GenerationProvider>, options: GenerationOptions) -> Self {
        Self { generator, options }
    }

    /// Start a streamed, context-grounded answer
    ///
    /// A provider failure before the first fragment is returned as `Err`;
    /// a later one ends the stream with a terminal `Err` item.
    pub async fn answer(
        &self,
        question: &str,
        retrieved_chunks: &[String],
        model_id: &str,
        provider_key: &str,
    ) -> Result<TextStream> {
        if question.trim().is_empty() {
            return Err(Error::invalid("question must not be empty"));
        }

        let prompt = PromptBuilder::grounded_prompt(question, retrieved_chunks);
        let request = GenerationRequest {
            messages: vec![ChatMessage::user(prompt)],
            model_id: model_id.to_string(),
            provider_key: provider_key.to_string(),
            options: self.options,
        };

        tracing::info!(
            "Generating answer with {} ({} context chunks, model {})",
            self.generator.name(),
            retrieved_chunks.len(),
            model_id
        );

        let stream = self.generator.generate(request).await.map_err(|e| {
            tracing::warn!("Answer generation failed to start: {}", e);
            e
        })?;

        stream.primed().await
    }
}
