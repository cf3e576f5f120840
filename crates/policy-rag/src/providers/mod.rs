//! Provider abstractions for embeddings and streamed generation
//!
//! The pipelines only see the traits; `OpenAiClient` is the HTTP
//! implementation used by the server.

pub mod embedding;
pub mod llm;
pub mod openai;

pub use embedding::EmbeddingProvider;
pub use llm::GenerationProvider;
pub use openai::{OpenAiClient, SseDecoder};
