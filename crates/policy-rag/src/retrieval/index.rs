//! In-memory embedding index holding exactly one document generation
//!
//! Search is a brute-force cosine scan: one policy document produces a few
//! hundred chunks at most.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Chunk, DocumentInfo, EmbeddedPassage, RetrievalResult};

/// One immutable replace-cycle of the index contents
#[derive(Debug, Default)]
pub struct Generation {
    number: u64,
    chunks: Vec<Chunk>,
    dimension: usize,
    document: Option<DocumentInfo>,
}

impl Generation {
    /// Generation number; 0 is the empty startup generation
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top-k chunks by cosine similarity, ties broken by ascending id
    pub fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(Error::invalid("k must be at least 1"));
        }
        if self.chunks.is_empty() {
            return Err(Error::EmptyIndex);
        }
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }

        let mut scored: Vec<(f32, &Chunk)> = self
            .chunks
            .iter()
            .map(|chunk| (cosine_similarity(query, chunk.vector()), chunk))
            .collect();

        scored.sort_by(|(sa, ca), (sb, cb)| sb.total_cmp(sa).then_with(|| ca.id().cmp(&cb.id())));
        scored.truncate(k);

        let (scores, chunks) = scored
            .into_iter()
            .map(|(score, chunk)| (score, chunk.clone()))
            .unzip();

        Ok(RetrievalResult { chunks, scores })
    }
}

/// Process-wide index; one active generation at a time
///
/// Readers clone the `Arc` of the current generation and scan it without
/// holding the lock. The write lock is held only for the pointer swap.
#[derive(Debug)]
pub struct EmbeddingIndex {
    current: RwLock<Arc<Generation>>,
}

impl Default for EmbeddingIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingIndex {
    /// Create an empty index (generation 0)
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Generation::default())),
        }
    }

    /// The generation a reader would see right now
    pub fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(&self.current.read())
    }

    /// Replace the current generation with `passages`
    ///
    /// The new generation is built and checked before the swap, so a failure
    /// leaves the previous one in place. Returns the new generation number.
    pub fn insert_all(
        &self,
        passages: Vec<EmbeddedPassage>,
        document: Option<DocumentInfo>,
    ) -> Result<u64> {
        let dimension = match passages.first() {
            Some(first) => first.vector.len(),
            None => return Err(Error::EmptyDocument),
        };
        if dimension == 0 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }
        if let Some(bad) = passages.iter().find(|p| p.vector.len() != dimension) {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                found: bad.vector.len(),
            });
        }

        let chunks: Vec<Chunk> = passages
            .into_iter()
            .enumerate()
            .map(|(i, p)| Chunk::new(i as u64, p.text, p.vector, p.source_offset))
            .collect();
        let num_chunks = chunks.len();

        let number = {
            let mut current = self.current.write();
            let number = current.number + 1;
            *current = Arc::new(Generation {
                number,
                chunks,
                dimension,
                document,
            });
            number
        };

        tracing::info!(
            "Installed index generation {} ({} chunks, dimension {})",
            number,
            num_chunks,
            dimension
        );

        Ok(number)
    }

    /// Search the current generation
    pub fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult> {
        self.snapshot().search(query, k)
    }

    pub fn len(&self) -> usize {
        self.current.read().chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().chunks.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.current.read().number
    }

    pub fn dimension(&self) -> usize {
        self.current.read().dimension
    }

    pub fn document(&self) -> Option<DocumentInfo> {
        self.current.read().document.clone()
    }
}

/// Cosine similarity in [-1, 1]
///
/// Zero-magnitude or length-mismatched inputs score -1 (least similar).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return -1.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return -1.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if !similarity.is_finite() {
        return -1.0;
    }
    similarity.clamp(-1.0, 1.0)
}
