//! Error types for the policy RAG engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine errors
///
/// Provider-originated failures (`EmbeddingFailed`, `GenerationFailed`) carry the
/// upstream reason verbatim. Everything else is raised locally.
#[derive(Debug, Error)]
pub enum Error {
    /// The uploaded file type cannot be parsed
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file type is known but its content is malformed
    #[error("Failed to extract text from '{filename}': {reason}")]
    ExtractionFailed { filename: String, reason: String },

    /// Extraction produced no usable text
    #[error("The document contains no extractable text")]
    EmptyDocument,

    /// Vectors in one generation (or a query) disagree on dimension
    #[error("Embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Nothing has been ingested yet
    #[error("No document has been indexed yet. Upload a document before asking questions.")]
    EmptyIndex,

    /// Embedding provider failure
    #[error("Embedding request failed: {reason}")]
    EmbeddingFailed { reason: String },

    /// Generation provider failure
    #[error("Answer generation failed: {reason}")]
    GenerationFailed { reason: String },

    /// Caller input rejected before any provider call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Too many requests from one client
    #[error("Rate limit exceeded. Maximum {limit} requests per {window_secs} seconds.")]
    RateLimited { limit: usize, window_secs: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(reason: impl Into<String>) -> Self {
        Self::EmbeddingFailed {
            reason: reason.into(),
        }
    }

    /// Create a generation error
    pub fn generation(reason: impl Into<String>) -> Self {
        Self::GenerationFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable tag, used in JSON bodies and stream events
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::ExtractionFailed { .. } => "extraction_failed",
            Error::EmptyDocument => "empty_document",
            Error::DimensionMismatch { .. } => "dimension_mismatch",
            Error::EmptyIndex => "empty_index",
            Error::EmbeddingFailed { .. } => "embedding_failed",
            Error::GenerationFailed { .. } => "generation_failed",
            Error::InvalidInput(_) => "invalid_input",
            Error::Config(_) => "config_error",
            Error::RateLimited { .. } => "rate_limited",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Whether the failure came from the embedding/generation provider
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Error::EmbeddingFailed { .. } | Error::GenerationFailed { .. }
        )
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::ExtractionFailed { .. } | Error::EmptyDocument => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::EmptyIndex => StatusCode::CONFLICT,
            Error::EmbeddingFailed { .. } | Error::GenerationFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::DimensionMismatch { .. }
            | Error::Config(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
