//! Query-time retrieval: embed the question, then search the index

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::RetrievalResult;

use super::index::EmbeddingIndex;

/// Retrieves the passages most similar to a question
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Top-k chunks for `query`, in descending similarity
    ///
    /// An empty index fails before the embedder is called.
    pub async fn retrieve(
        &self,
        index: &EmbeddingIndex,
        query: &str,
        k: usize,
        provider_key: &str,
    ) -> Result<RetrievalResult> {
        if query.trim().is_empty() {
            return Err(Error::invalid("question must not be empty"));
        }
        if k == 0 {
            return Err(Error::invalid("k must be at least 1"));
        }

        let snapshot = index.snapshot();
        if snapshot.is_empty() {
            return Err(Error::EmptyIndex);
        }

        let query_vector = self
            .embedder
            .embed(query, provider_key)
            .await
            .map_err(|e| {
                tracing::warn!("Query embedding via {} failed: {}", self.embedder.name(), e);
                as_embedding_failure(e)
            })?;

        // Search the generation current at the time the question arrived
        let result = snapshot.search(&query_vector, k)?;

        tracing::debug!(
            "Retrieved {} chunks from generation {} (top score {:?})",
            result.len(),
            snapshot.number(),
            result.scores.first()
        );

        Ok(result)
    }

    /// Top-k chunk texts for `query`, unmodified and in similarity order
    pub async fn retrieve_texts(
        &self,
        index: &EmbeddingIndex,
        query: &str,
        k: usize,
        provider_key: &str,
    ) -> Result<Vec<String>> {
        Ok(self.retrieve(index, query, k, provider_key).await?.texts())
    }
}

/// Provider trait errors surface as `EmbeddingFailed` regardless of variant
pub(crate) fn as_embedding_failure(error: Error) -> Error {
    match error {
        Error::EmbeddingFailed { .. } => error,
        other => Error::embedding(other.to_string()),
    }
}
