//! Document, chunk and retrieval types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported upload formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileFormat {
    /// Detect format from a filename's extension
    pub fn from_filename(filename: &str) -> Self {
        let extension = match filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => return Self::Unknown,
        };

        match extension.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Unknown => "Unknown",
        }
    }
}

/// The document behind the active index generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Unique document ID
    pub id: Uuid,
    /// Filename as uploaded
    pub filename: String,
    /// Detected format
    pub format: FileFormat,
    /// SHA-256 of the extracted text
    pub content_hash: String,
    /// Extracted text length in characters
    pub char_count: usize,
    /// Ingestion timestamp
    pub ingested_at: DateTime<Utc>,
}

impl DocumentInfo {
    /// Describe a freshly extracted document
    pub fn new(filename: impl Into<String>, format: FileFormat, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            format,
            content_hash: hash_content(text),
            char_count: text.chars().count(),
            ingested_at: Utc::now(),
        }
    }
}

/// Hash content for identification
pub fn hash_content(content: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// A passage of the indexed document plus its embedding
///
/// Created only while a generation is being built; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    id: u64,
    text: String,
    #[serde(skip)]
    vector: Vec<f32>,
    source_offset: usize,
}

impl Chunk {
    pub(crate) fn new(id: u64, text: String, vector: Vec<f32>, source_offset: usize) -> Self {
        Self {
            id,
            text,
            vector,
            source_offset,
        }
    }

    /// Insertion order within the generation
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// Character offset of the first character in the extracted text
    pub fn source_offset(&self) -> usize {
        self.source_offset
    }
}

/// Chunk text and offset handed to the index on insert
#[derive(Debug, Clone)]
pub struct EmbeddedPassage {
    pub text: String,
    pub vector: Vec<f32>,
    pub source_offset: usize,
}

/// Top-k search output, ordered by descending similarity
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    /// Retrieved chunks
    pub chunks: Vec<Chunk>,
    /// Cosine similarity per chunk, parallel to `chunks`
    pub scores: Vec<f32>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk texts in similarity order
    pub fn texts(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.text().to_string()).collect()
    }
}
