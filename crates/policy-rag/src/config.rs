//! Configuration for the policy RAG engine

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable naming a TOML config file
pub const CONFIG_PATH_ENV: &str = "POLICY_RAG_CONFIG";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Embedding/generation provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Generation defaults and chat request limits
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl RagConfig {
    /// Load configuration: TOML file (if given and present), then env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                let config = Self::from_toml_str(&raw)?;
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            Some(path) => {
                tracing::warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing sections fall back to defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Apply `POLICY_RAG_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("POLICY_RAG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("POLICY_RAG_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid POLICY_RAG_PORT: {}", port)))?;
        }
        if let Ok(url) = std::env::var("POLICY_RAG_PROVIDER_URL") {
            self.provider.base_url = url;
        }
        Ok(())
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be at least 1".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.default_top_k == 0 {
            return Err(Error::Config("retrieval.default_top_k must be at least 1".into()));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(Error::Config("provider.base_url must not be empty".into()));
        }
        if self.generation.allowed_models.is_empty() {
            return Err(Error::Config("generation.allowed_models must not be empty".into()));
        }
        if !self
            .generation
            .allowed_models
            .contains(&self.provider.default_chat_model)
        {
            return Err(Error::Config(format!(
                "provider.default_chat_model '{}' is not in generation.allowed_models",
                self.provider.default_chat_model
            )));
        }
        if self.server.rate_limit.max_requests == 0 || self.server.rate_limit.window_secs == 0 {
            return Err(Error::Config("server.rate_limit values must be positive".into()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 25MB)
    pub max_upload_size: usize,
    /// Per-client rate limiting
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 25 * 1024 * 1024,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Sliding-window rate limit per client address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Disable to let every request through
    pub enabled: bool,
    /// Requests allowed per window
    pub max_requests: usize,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 10,
            window_secs: 60,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks retrieved when the caller does not say
    pub default_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_top_k: 4 }
    }
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API base URL (no trailing `/chat/completions`)
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Chat model used when the caller does not pick one
    pub default_chat_model: String,
    /// Model used for the key validation probe
    pub validation_model: String,
    /// TCP connect timeout; request deadlines are left to the transport layer
    pub connect_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            default_chat_model: "gpt-4.1-mini".to_string(),
            validation_model: "gpt-3.5-turbo".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

/// Generation defaults and chat request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Default sampling temperature
    pub temperature: f32,
    /// Default completion length limit
    pub max_tokens: u32,
    /// Longest accepted chat message, in characters
    pub max_message_chars: usize,
    /// Models callers may select
    pub allowed_models: Vec<String>,
    /// Prefix every provider key must carry (None disables the check)
    pub required_key_prefix: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            max_message_chars: 4000,
            allowed_models: vec![
                "gpt-4.1-mini".to_string(),
                "gpt-4".to_string(),
                "gpt-3.5-turbo".to_string(),
                "gpt-4-turbo".to_string(),
            ],
            required_key_prefix: Some("sk-".to_string()),
        }
    }
}
