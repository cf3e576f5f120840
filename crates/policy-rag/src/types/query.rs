//! Request types accepted by the HTTP layer

use serde::{Deserialize, Serialize};

use super::chat::{ChatTurn, GenerationOptions};

/// Question against the indexed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Number of chunks to retrieve (default: config `retrieval.default_top_k`)
    #[serde(default)]
    pub k: Option<usize>,

    /// Chat model (default: config `provider.default_chat_model`)
    #[serde(default)]
    pub model: Option<String>,

    /// Caller's provider key
    pub api_key: String,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            k: None,
            model: None,
            api_key: api_key.into(),
        }
    }

    /// Set the number of results to retrieve
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }
}

/// Direct chat request (no retrieval)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// System prompt defining AI behavior
    pub developer_message: String,
    /// User's message to the AI
    pub user_message: String,
    #[serde(default)]
    pub model: Option<String>,
    pub api_key: String,
    /// Response creativity (0-2)
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Maximum response length
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Convert into a chat turn, filling gaps from defaults
    pub fn into_turn(self, default_model: &str, defaults: GenerationOptions) -> ChatTurn {
        let options = GenerationOptions {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        };

        ChatTurn::new(
            self.developer_message,
            self.user_message,
            self.model.unwrap_or_else(|| default_model.to_string()),
            self.api_key,
        )
        .with_options(options)
    }
}

/// Key validation probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateKeyRequest {
    pub api_key: String,
}

/// Per-upload chunking overrides
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Custom chunk size (overrides config)
    pub chunk_size: Option<usize>,
    /// Custom chunk overlap (overrides config)
    pub chunk_overlap: Option<usize>,
}
