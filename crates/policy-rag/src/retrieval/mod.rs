//! Embedding index and query-time retrieval

pub mod index;
pub mod search;

pub use index::{cosine_similarity, EmbeddingIndex, Generation};
pub use search::Retriever;
