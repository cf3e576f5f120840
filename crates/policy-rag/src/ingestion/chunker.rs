//! Fixed-size sliding-window chunking
//!
//! Sizes and overlaps are measured in characters (Unicode scalar values), so a
//! boundary never falls inside a UTF-8 sequence.

use crate::error::{Error, Result};

/// A chunk of text and where it starts in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    /// Character offset of the span's first character
    pub offset: usize,
}

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Window length in characters
    chunk_size: usize,
    /// Characters shared by consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; requires `chunk_size >= 1` and `overlap < chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid("chunk size must be at least 1"));
        }
        if overlap >= chunk_size {
            return Err(Error::invalid(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into overlapping windows
    ///
    /// A window starts at every multiple of `chunk_size - overlap` below the
    /// text length. Windows near the end are truncated, so the trailing chunks
    /// can be short and may lie entirely inside their predecessor.
    pub fn chunk(&self, text: &str) -> Vec<TextSpan> {
        // Byte index of every char start, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        let step = self.chunk_size - self.overlap;

        let mut spans = Vec::new();
        let mut start = 0usize;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            spans.push(TextSpan {
                text: text[boundaries[start]..boundaries[end]].to_string(),
                offset: start,
            });
            start += step;
        }

        spans
    }
}

/// Chunk `text` into windows of `size` characters sharing `overlap` characters
pub fn chunk(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    let chunker = TextChunker::new(size, overlap)?;
    Ok(chunker.chunk(text).into_iter().map(|s| s.text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Undo the overlap: first chunk whole, then each later chunk minus its prefix
    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, c) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(c);
            } else {
                out.extend(c.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk("", 10, 2).unwrap().is_empty());
    }

    #[test]
    fn test_short_input_is_single_chunk() {
        assert_eq!(chunk("abc", 10, 2).unwrap(), vec!["abc".to_string()]);
    }

    #[test]
    fn test_window_and_step() {
        let chunks = chunk("abcdefghij", 4, 1).unwrap();
        assert_eq!(chunks, vec!["abcd", "defg", "ghij", "j"]);

        let chunks = chunk("abcdefghijk", 4, 1).unwrap();
        assert_eq!(chunks, vec!["abcd", "defg", "ghij", "jk"]);
    }

    #[test]
    fn test_every_window_start_emits_a_chunk() {
        // 70 chars, size 40, step 30: windows start at 0, 30 and 60
        let text = "x".repeat(70);
        let chunker = TextChunker::new(40, 10).unwrap();
        let spans = chunker.chunk(&text);

        let offsets: Vec<usize> = spans.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 30, 60]);
        assert_eq!(spans[1].text.len(), 40);
        assert_eq!(spans[2].text.len(), 10);
        assert_eq!(reconstruct(&chunk(&text, 40, 10).unwrap(), 10), text);
    }

    #[test]
    fn test_reconstruction_for_many_parameters() {
        let text = "Collision coverage deductible is $500. Rental reimbursement is not covered. \
                    Comprehensive claims require photos within 14 days.";
        for size in 1..=30 {
            for overlap in 0..size {
                let chunks = chunk(text, size, overlap).unwrap();
                assert_eq!(
                    reconstruct(&chunks, overlap),
                    text,
                    "size={} overlap={}",
                    size,
                    overlap
                );
                assert!(chunks.iter().all(|c| c.chars().count() <= size));
            }
        }
    }

    #[test]
    fn test_multibyte_characters_are_not_split() {
        let text = "Prämie über 500 € — fällig am 1. März";
        let chunks = chunk(text, 7, 3).unwrap();
        assert_eq!(reconstruct(&chunks, 3), text);
        assert_eq!(chunks.len(), 10);
        assert!(chunks[..8].iter().all(|c| c.chars().count() == 7));
        assert_eq!(chunks[9], "z");
    }

    #[test]
    fn test_offsets_are_character_positions() {
        let chunker = TextChunker::new(4, 2).unwrap();
        let spans = chunker.chunk("ééééééé");
        let offsets: Vec<usize> = spans.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_deterministic() {
        let text = "The insured must notify the insurer within thirty days of any loss.";
        assert_eq!(chunk(text, 16, 5).unwrap(), chunk(text, 16, 5).unwrap());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(TextChunker::new(0, 0), Err(Error::InvalidInput(_))));
        assert!(matches!(TextChunker::new(5, 5), Err(Error::InvalidInput(_))));
        assert!(TextChunker::new(5, 4).is_ok());
    }
}
