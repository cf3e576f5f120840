//! Provider-neutral chat and generation request types

use serde::{Deserialize, Serialize};

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message sent to the generation provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling options for a completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Response creativity (0.0-2.0)
    pub temperature: f32,
    /// Maximum response length in tokens
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Everything the generation capability needs for one streamed completion
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub model_id: String,
    pub provider_key: String,
    pub options: GenerationOptions,
}

/// A single-turn chat request (ephemeral, never stored)
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// System prompt defining assistant behavior
    pub developer_instruction: String,
    /// The user's message
    pub user_text: String,
    pub model_id: String,
    pub provider_key: String,
    /// Falls back to configured defaults when absent
    pub options: Option<GenerationOptions>,
}

impl ChatTurn {
    pub fn new(
        developer_instruction: impl Into<String>,
        user_text: impl Into<String>,
        model_id: impl Into<String>,
        provider_key: impl Into<String>,
    ) -> Self {
        Self {
            developer_instruction: developer_instruction.into(),
            user_text: user_text.into(),
            model_id: model_id.into(),
            provider_key: provider_key.into(),
            options: None,
        }
    }

    /// Override sampling options
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Catalog entry for a selectable chat model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub max_tokens: u32,
    pub cost_per_1k_tokens: f64,
}

impl ModelInfo {
    fn entry(id: &str, name: &str, description: &str, max_tokens: u32, cost: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            max_tokens,
            cost_per_1k_tokens: cost,
        }
    }

    /// Known models; the catalog is filtered by the configured allow-list
    pub fn catalog(allowed: &[String]) -> Vec<ModelInfo> {
        let known = [
            Self::entry(
                "gpt-4.1-mini",
                "GPT-4.1 Mini",
                "Fast and efficient model for most tasks",
                4000,
                0.00015,
            ),
            Self::entry(
                "gpt-4",
                "GPT-4",
                "Most capable model for complex reasoning",
                8192,
                0.03,
            ),
            Self::entry(
                "gpt-3.5-turbo",
                "GPT-3.5 Turbo",
                "Fast and cost-effective for simple tasks",
                4096,
                0.002,
            ),
            Self::entry(
                "gpt-4-turbo",
                "GPT-4 Turbo",
                "Latest GPT-4 model with improved performance",
                128000,
                0.01,
            ),
        ];

        let mut models: Vec<ModelInfo> = known
            .into_iter()
            .filter(|m| allowed.contains(&m.id))
            .collect();

        // Allowed models we have no metadata for still show up
        for id in allowed {
            if !models.iter().any(|m| &m.id == id) {
                models.push(Self::entry(id, id, "Custom model", 0, 0.0));
            }
        }

        models
    }
}
