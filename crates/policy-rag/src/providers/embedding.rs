//! Embedding provider trait for turning text into vectors

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generating text embeddings
///
/// The caller's provider key travels with every request; nothing is cached.
/// Implementations:
/// - `OpenAiClient`: any OpenAI-compatible `/embeddings` endpoint
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    ///
    /// Fails with `EmbeddingFailed` carrying the provider's reason.
    async fn embed(&self, text: &str, provider_key: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for several texts, in order
    ///
    /// Default implementation calls `embed` sequentially and stops at the
    /// first failure.
    async fn embed_batch(&self, texts: &[String], provider_key: &str) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text, provider_key).await?);
        }
        Ok(embeddings)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
