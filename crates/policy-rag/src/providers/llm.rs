//! Generation provider trait for streamed completions

use async_trait::async_trait;

use crate::error::Result;
use crate::generation::TextStream;
use crate::types::GenerationRequest;

/// Trait for streaming chat completions
///
/// Implementations:
/// - `OpenAiClient`: any OpenAI-compatible `/chat/completions` endpoint
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Start a streamed completion
    ///
    /// Failures before the first fragment are returned directly; failures
    /// after that arrive as the terminal item of the stream.
    async fn generate(&self, request: GenerationRequest) -> Result<TextStream>;

    /// Probe whether a provider key is accepted
    async fn validate_key(&self, provider_key: &str) -> bool;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
