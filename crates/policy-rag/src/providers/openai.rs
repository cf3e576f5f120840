//! OpenAI-compatible HTTP provider for embeddings and streamed chat

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::generation::TextStream;
use crate::types::{ChatMessage, GenerationRequest};

use super::embedding::EmbeddingProvider;
use super::llm::GenerationProvider;

/// Client for an OpenAI-compatible API
///
/// Keys are per request; the client itself holds no credentials.
/// Only a connect timeout is set and nothing is retried.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    embed_model: String,
    validation_model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiClient {
    /// Create a new client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embed_model: config.embed_model.clone(),
            validation_model: config.validation_model.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str, provider_key: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embed_model,
            input: text,
        };

        let response = self
            .client
            .post(self.url("embeddings"))
            .bearer_auth(provider_key.trim())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(provider_error_message(status, &body)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse response: {}", e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::embedding("Response contained no embedding"))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl GenerationProvider for OpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<TextStream> {
        let body = CompletionRequest {
            model: &request.model_id,
            messages: &request.messages,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            stream: true,
        };

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(request.provider_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(provider_error_message(status, &body)));
        }

        Ok(sse_fragments(response.bytes_stream()))
    }

    async fn validate_key(&self, provider_key: &str) -> bool {
        let messages = [ChatMessage::user("Hello")];
        let body = CompletionRequest {
            model: &self.validation_model,
            messages: &messages,
            temperature: 0.0,
            max_tokens: 5,
            stream: false,
        };

        let result = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(provider_key.trim())
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::info!("Key validation rejected: HTTP {}", response.status());
                false
            }
            Err(e) => {
                tracing::warn!("Key validation request failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Human-readable reason for a non-2xx provider response
fn provider_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => format!("HTTP {}: {}", status, parsed.error.message),
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => format!("HTTP {}: {}", status, body.trim()),
    }
}

/// Incremental decoder for `text/event-stream` completion bodies
///
/// Network chunks may end mid-line (or mid-character); partial lines are
/// buffered until their newline arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` terminator (or end of body) has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw body bytes, returning every fragment completed by them
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<String>> {
        let mut out = Vec::new();
        if self.done {
            return out;
        }

        self.buffer.extend_from_slice(bytes);
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.decode_line(&line, &mut out);
            if self.done {
                self.buffer.clear();
                break;
            }
        }

        out
    }

    /// Flush a final line that had no trailing newline
    pub fn finish(&mut self) -> Vec<Result<String>> {
        let mut out = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.decode_line(&line, &mut out);
        }
        self.done = true;
        out
    }

    fn decode_line(&mut self, raw: &[u8], out: &mut Vec<Result<String>>) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);

        // Blank lines separate events; ':' lines are comments/keep-alives
        let Some(payload) = line.strip_prefix("data:") else {
            return;
        };
        let payload = payload.trim();

        if payload == "[DONE]" {
            self.done = true;
            return;
        }
        if payload.is_empty() {
            return;
        }

        match serde_json::from_str::<StreamChunk>(payload) {
            Ok(chunk) => {
                if let Some(error) = chunk.error {
                    out.push(Err(Error::generation(error.message)));
                    self.done = true;
                    return;
                }
                if let Some(content) = chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                {
                    out.push(Ok(content));
                }
            }
            Err(e) => {
                out.push(Err(Error::generation(format!(
                    "Malformed stream event: {}",
                    e
                ))));
                self.done = true;
            }
        }
    }
}

type ByteStream<E> = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, E>> + Send>>;

struct SseState<E> {
    body: ByteStream<E>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String>>,
}

/// Turn an SSE response body into a fragment stream
///
/// The body is read only as fast as the consumer pulls, and reading stops
/// at `[DONE]`.
pub(crate) fn sse_fragments<S, E>(body: S) -> TextStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = SseState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
    };

    let fragments = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.decoder.is_done() {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    let decoded = state.decoder.feed(&bytes);
                    state.pending.extend(decoded);
                }
                Some(Err(e)) => {
                    tracing::warn!("Completion stream interrupted: {}", e);
                    let error = Error::generation(format!("Stream interrupted: {}", e));
                    return Some((Err(error), state));
                }
                None => {
                    let decoded = state.decoder.finish();
                    state.pending.extend(decoded);
                }
            }
        }
    });

    TextStream::new(fragments)
}
