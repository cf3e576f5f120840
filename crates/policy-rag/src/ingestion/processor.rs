//! Ingestion pipeline orchestration: extract, chunk, embed, replace

use std::sync::Arc;
use std::time::Instant;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::retrieval::search::as_embedding_failure;
use crate::retrieval::EmbeddingIndex;
use crate::types::{DocumentInfo, EmbeddedPassage, IngestOptions, IngestReport};

use super::chunker::TextChunker;
use super::parser::TextExtractor;

/// Main ingestion pipeline
///
/// Nothing touches the index until every chunk has been embedded; any
/// failure leaves the previous generation active.
pub struct IngestPipeline {
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
    /// Chunking used when a request carries no overrides
    chunker: TextChunker,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunking: &ChunkingConfig,
    ) -> Result<Self> {
        Ok(Self {
            extractor,
            embedder,
            chunker: TextChunker::new(chunking.chunk_size, chunking.chunk_overlap)?,
        })
    }

    /// Chunker for one request: defaults with any overrides applied
    fn chunker_for(&self, options: IngestOptions) -> Result<TextChunker> {
        match (options.chunk_size, options.chunk_overlap) {
            (None, None) => Ok(self.chunker),
            (size, overlap) => TextChunker::new(
                size.unwrap_or(self.chunker.chunk_size()),
                overlap.unwrap_or(self.chunker.overlap()),
            ),
        }
    }

    /// Full ingestion: extract + chunk + embed + install a new generation
    pub async fn ingest(
        &self,
        index: &EmbeddingIndex,
        data: &[u8],
        filename: &str,
        provider_key: &str,
        options: IngestOptions,
    ) -> Result<IngestReport> {
        let started = Instant::now();
        let chunker = self.chunker_for(options)?;

        tracing::info!("Ingesting '{}' ({} bytes)", filename, data.len());

        let extracted = self.extractor.extract_text(data, filename).await?;
        if extracted.text.trim().is_empty() {
            tracing::warn!("'{}' contains no extractable text", filename);
            return Err(Error::EmptyDocument);
        }

        let spans = chunker.chunk(&extracted.text);
        tracing::info!(
            "Split '{}' ({}) into {} chunks (size {}, overlap {})",
            filename,
            extracted.format.display_name(),
            spans.len(),
            chunker.chunk_size(),
            chunker.overlap()
        );

        let mut passages = Vec::with_capacity(spans.len());
        for (i, span) in spans.into_iter().enumerate() {
            let vector = self
                .embedder
                .embed(&span.text, provider_key)
                .await
                .map_err(|e| {
                    tracing::warn!(
                        "Embedding chunk {} of '{}' via {} failed: {}",
                        i,
                        filename,
                        self.embedder.name(),
                        e
                    );
                    as_embedding_failure(e)
                })?;
            tracing::debug!("Embedded chunk {} ({} dims)", i, vector.len());

            passages.push(EmbeddedPassage {
                text: span.text,
                vector,
                source_offset: span.offset,
            });
        }

        let document = DocumentInfo::new(filename, extracted.format, &extracted.text);
        let num_chunks = passages.len();
        let generation = index.insert_all(passages, Some(document.clone()))?;

        let processing_time_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            "Indexed '{}': {} chunks, generation {}, {}ms",
            filename,
            num_chunks,
            generation,
            processing_time_ms
        );

        Ok(IngestReport {
            num_chunks,
            generation,
            document,
            processing_time_ms,
        })
    }
}
