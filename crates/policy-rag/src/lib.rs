//! policy-rag: question answering over a single uploaded policy document
//!
//! A document is extracted, split into overlapping chunks, embedded and
//! installed as the one searchable index. Questions are embedded, matched
//! against the index by cosine similarity, and answered by a language model
//! that streams its reply grounded in the retrieved passages. A separate
//! chat path streams single-turn completions with no retrieval.

pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use engine::{AnswerResponse, RagEngine, RagEngineBuilder};
pub use error::{Error, Result};
pub use generation::{StreamOutcome, TextStream};
pub use types::{
    document::{Chunk, DocumentInfo, FileFormat, RetrievalResult},
    query::{ChatRequest, QueryRequest},
    response::{IndexStatus, IngestReport, StreamEvent},
    ChatTurn,
};
