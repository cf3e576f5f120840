//! In-process providers for integration tests (no network)

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use policy_rag::config::RagConfig;
use policy_rag::providers::{EmbeddingProvider, GenerationProvider};
use policy_rag::types::GenerationRequest;
use policy_rag::{Error, RagEngine, Result, TextStream};

pub const FEATURES: [&str; 6] = [
    "deductible",
    "$500",
    "rental",
    "reimbursement",
    "covered",
    "collision",
];

pub const POLICY_TEXT: &str =
    "Collision coverage deductible is $500. Rental reimbursement is not covered.";

/// Embeds text as keyword counts; can be armed to fail on a later call
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
    fail_on_call: Mutex<Option<usize>>,
}

impl KeywordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fail the `n`th call from now (1-based)
    pub fn fail_after(&self, n: usize) {
        *self.fail_on_call.lock() = Some(self.calls() + n);
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str, _provider_key: &str) -> Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_on_call.lock() == Some(call) {
            return Err(Error::embedding("HTTP 429 Too Many Requests: rate limited"));
        }

        let lower = text.to_lowercase();
        Ok(FEATURES
            .iter()
            .map(|f| lower.matches(f).count() as f32)
            .collect())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Streams the prompt it was given back, word by word
#[derive(Default)]
pub struct EchoGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
}

#[async_trait]
impl GenerationProvider for EchoGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<TextStream> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.requests.lock().push(request);

        let words: Vec<String> = prompt.split_inclusive(' ').map(str::to_string).collect();
        Ok(TextStream::from_fragments(words))
    }

    async fn validate_key(&self, provider_key: &str) -> bool {
        provider_key == "sk-valid"
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Endless fragment stream that counts how often it is polled
#[derive(Default)]
pub struct EndlessGenerator {
    pub polls: Arc<AtomicUsize>,
}

#[async_trait]
impl GenerationProvider for EndlessGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<TextStream> {
        let polls = Arc::clone(&self.polls);
        Ok(TextStream::new(stream::unfold(0usize, move |n| {
            let polls = Arc::clone(&polls);
            async move {
                polls.fetch_add(1, Ordering::SeqCst);
                Some((Ok(format!("word{} ", n)), n + 1))
            }
        })))
    }

    async fn validate_key(&self, _provider_key: &str) -> bool {
        true
    }

    fn name(&self) -> &str {
        "endless"
    }
}

pub fn test_config(chunk_size: usize, chunk_overlap: usize) -> RagConfig {
    let mut config = RagConfig::default();
    config.chunking.chunk_size = chunk_size;
    config.chunking.chunk_overlap = chunk_overlap;
    config.server.rate_limit.enabled = false;
    config
}

pub fn engine_with(
    config: RagConfig,
    embedder: Arc<KeywordEmbedder>,
    generator: Arc<dyn GenerationProvider>,
) -> RagEngine {
    RagEngine::builder(config)
        .embedder(embedder)
        .generator(generator)
        .build()
        .unwrap()
}
