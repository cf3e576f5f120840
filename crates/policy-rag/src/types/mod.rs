//! Core types for the policy RAG engine

pub mod chat;
pub mod document;
pub mod query;
pub mod response;

pub use chat::{ChatMessage, ChatTurn, GenerationOptions, GenerationRequest, ModelInfo, Role};
pub use document::{Chunk, DocumentInfo, EmbeddedPassage, FileFormat, RetrievalResult};
pub use query::{ChatRequest, IngestOptions, QueryRequest, ValidateKeyRequest};
pub use response::{IndexStatus, IngestReport, StreamEvent};
