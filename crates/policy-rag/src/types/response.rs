//! Response types for ingestion, status and streamed answers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chat::ModelInfo;
use super::document::DocumentInfo;

/// Outcome of a successful ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Chunks in the new generation
    pub num_chunks: usize,
    /// Generation number now active
    pub generation: u64,
    /// The document now indexed
    pub document: DocumentInfo,
    /// Wall time spent on extraction, embedding and install
    pub processing_time_ms: u64,
}

/// What the index currently holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatus {
    pub generation: u64,
    pub num_chunks: usize,
    pub dimension: usize,
    pub document: Option<DocumentInfo>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    /// Seconds since the server started
    pub uptime_secs: f64,
}

/// Model catalog response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// Key validation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateKeyResponse {
    pub valid: bool,
    pub message: String,
    pub model_tested: Option<String>,
}

/// One line of an NDJSON answer/chat stream
///
/// Every stream ends with exactly one `Done` or `Error`; a stream without
/// either was cut off in transit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Retrieved context, sent before any answer text
    Context { chunks: Vec<String>, scores: Vec<f32> },
    /// A fragment of generated text
    Delta { text: String },
    /// Generation finished normally
    Done,
    /// Generation stopped early; fragments already sent stand
    Error { kind: String, message: String },
}

impl StreamEvent {
    /// Serialize as one NDJSON line
    pub fn to_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","kind":"internal_error","message":"unserializable event: {}"}}"#,
                e
            )
        });
        line.push('\n');
        line
    }
}
