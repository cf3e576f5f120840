//! Engine facade: one index, the pipelines over it, and their providers

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{AnswerSynthesizer, ChatPipeline, TextStream};
use crate::ingestion::{FileParser, IngestPipeline, TextExtractor};
use crate::providers::{EmbeddingProvider, GenerationProvider, OpenAiClient};
use crate::retrieval::{EmbeddingIndex, Retriever};
use crate::types::{
    ChatTurn, GenerationOptions, IndexStatus, IngestOptions, IngestReport, ModelInfo, QueryRequest,
};

/// Retrieved context plus the answer streaming over it
#[derive(Debug)]
pub struct AnswerResponse {
    /// Chunk texts the answer is grounded on, most similar first
    pub context: Vec<String>,
    pub scores: Vec<f32>,
    pub answer: TextStream,
}

/// The question-answering engine over a single indexed document
pub struct RagEngine {
    config: RagConfig,
    index: EmbeddingIndex,
    ingest: IngestPipeline,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    chat: ChatPipeline,
    generator: Arc<dyn GenerationProvider>,
    models: Vec<ModelInfo>,
}

/// Builder for [`RagEngine`]
pub struct RagEngineBuilder {
    config: RagConfig,
    extractor: Option<Arc<dyn TextExtractor>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn GenerationProvider>>,
}

impl RagEngineBuilder {
    /// Text extraction (default: [`FileParser`])
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn GenerationProvider>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build(self) -> Result<RagEngine> {
        self.config.validate()?;

        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(FileParser) as Arc<dyn TextExtractor>);
        let embedder = self
            .embedder
            .ok_or_else(|| Error::Config("an embedding provider is required".into()))?;
        let generator = self
            .generator
            .ok_or_else(|| Error::Config("a generation provider is required".into()))?;

        let config = self.config;
        let defaults = GenerationOptions {
            temperature: config.generation.temperature,
            max_tokens: config.generation.max_tokens,
        };

        tracing::info!(
            "Engine ready (embeddings: {}, generation: {}, chunking {}/{})",
            embedder.name(),
            generator.name(),
            config.chunking.chunk_size,
            config.chunking.chunk_overlap
        );

        Ok(RagEngine {
            index: EmbeddingIndex::new(),
            ingest: IngestPipeline::new(extractor, Arc::clone(&embedder), &config.chunking)?,
            retriever: Retriever::new(embedder),
            synthesizer: AnswerSynthesizer::new(Arc::clone(&generator), defaults),
            chat: ChatPipeline::new(Arc::clone(&generator), config.generation.clone()),
            generator,
            models: ModelInfo::catalog(&config.generation.allowed_models),
            config,
        })
    }
}

impl RagEngine {
    pub fn builder(config: RagConfig) -> RagEngineBuilder {
        RagEngineBuilder {
            config,
            extractor: None,
            embedder: None,
            generator: None,
        }
    }

    /// Engine backed by the configured OpenAI-compatible endpoint
    pub fn with_openai(config: RagConfig) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(&config.provider)?);
        Self::builder(config)
            .embedder(client.clone())
            .generator(client)
            .build()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The index; exposed for status reporting and tests
    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    /// Replace the indexed document with `data`
    pub async fn ingest(
        &self,
        data: &[u8],
        filename: &str,
        provider_key: &str,
    ) -> Result<IngestReport> {
        self.ingest_with(data, filename, provider_key, IngestOptions::default())
            .await
    }

    /// Replace the indexed document, overriding chunk size/overlap
    pub async fn ingest_with(
        &self,
        data: &[u8],
        filename: &str,
        provider_key: &str,
        options: IngestOptions,
    ) -> Result<IngestReport> {
        self.ingest
            .ingest(&self.index, data, filename, provider_key, options)
            .await
    }

    /// Retrieve the top-k passages for `question` and stream a grounded answer
    pub async fn retrieve_and_answer(
        &self,
        question: &str,
        k: usize,
        model_id: &str,
        provider_key: &str,
    ) -> Result<AnswerResponse> {
        self.check_model(model_id)?;

        let retrieved = self
            .retriever
            .retrieve(&self.index, question, k, provider_key)
            .await?;
        let context = retrieved.texts();

        let answer = self
            .synthesizer
            .answer(question, &context, model_id, provider_key)
            .await?;

        Ok(AnswerResponse {
            context,
            scores: retrieved.scores,
            answer,
        })
    }

    /// [`RagEngine::retrieve_and_answer`] with configured defaults filled in
    pub async fn query(&self, request: QueryRequest) -> Result<AnswerResponse> {
        let k = request.k.unwrap_or(self.config.retrieval.default_top_k);
        let model = request
            .model
            .unwrap_or_else(|| self.config.provider.default_chat_model.clone());

        self.retrieve_and_answer(&request.question, k, &model, &request.api_key)
            .await
    }

    /// Stream a single-turn chat completion (no retrieval)
    pub async fn chat(&self, turn: ChatTurn) -> Result<TextStream> {
        self.chat.chat(turn).await
    }

    /// Whether the provider accepts `provider_key`
    pub async fn validate_key(&self, provider_key: &str) -> bool {
        if provider_key.trim().is_empty() {
            return false;
        }
        self.generator.validate_key(provider_key).await
    }

    /// What is currently indexed
    pub fn index_status(&self) -> IndexStatus {
        let snapshot = self.index.snapshot();
        IndexStatus {
            generation: snapshot.number(),
            num_chunks: snapshot.chunks().len(),
            dimension: snapshot.dimension(),
            document: snapshot.document().cloned(),
        }
    }

    /// Selectable chat models
    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Defaults for chat turns that carry no options
    pub fn default_options(&self) -> GenerationOptions {
        self.chat.default_options()
    }

    fn check_model(&self, model_id: &str) -> Result<()> {
        if self
            .config
            .generation
            .allowed_models
            .iter()
            .any(|m| m == model_id)
        {
            Ok(())
        } else {
            Err(Error::invalid(format!("Model '{}' is not available", model_id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerationRequest;
    use async_trait::async_trait;

    struct UnitEmbedder;

    #[async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn embed(&self, text: &str, _provider_key: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, text.len() as f32 / 100.0])
        }

        fn name(&self) -> &str {
            "unit"
        }
    }

    struct FixedGenerator;

    #[async_trait]
    impl GenerationProvider for FixedGenerator {
        async fn generate(&self, _request: GenerationRequest) -> Result<TextStream> {
            Ok(TextStream::from_fragments(vec!["ok".to_string()]))
        }

        async fn validate_key(&self, provider_key: &str) -> bool {
            provider_key == "sk-good"
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn engine() -> RagEngine {
        RagEngine::builder(RagConfig::default())
            .embedder(Arc::new(UnitEmbedder))
            .generator(Arc::new(FixedGenerator))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_providers() {
        let result = RagEngine::builder(RagConfig::default())
            .generator(Arc::new(FixedGenerator))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_status_reflects_ingestion() {
        let engine = engine();
        let status = engine.index_status();
        assert_eq!(status.generation, 0);
        assert!(status.document.is_none());

        engine
            .ingest(b"Glass breakage is covered.", "glass.txt", "sk-good")
            .await
            .unwrap();

        let status = engine.index_status();
        assert_eq!(status.generation, 1);
        assert_eq!(status.num_chunks, 1);
        assert_eq!(status.dimension, 2);
        assert_eq!(status.document.unwrap().filename, "glass.txt");
    }

    #[tokio::test]
    async fn test_query_fills_defaults() {
        let engine = engine();
        engine
            .ingest(b"Glass breakage is covered.", "glass.txt", "sk-good")
            .await
            .unwrap();

        let response = engine
            .query(QueryRequest::new("Is glass covered?", "sk-good"))
            .await
            .unwrap();
        assert_eq!(response.context.len(), 1);
        assert_eq!(response.answer.collect_text().await.text, "ok");
    }

    #[tokio::test]
    async fn test_unknown_model_is_rejected() {
        let engine = engine();
        let result = engine
            .retrieve_and_answer("Is glass covered?", 1, "mystery-model", "sk-good")
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_validate_key_passthrough() {
        let engine = engine();
        assert!(engine.validate_key("sk-good").await);
        assert!(!engine.validate_key("sk-bad").await);
        assert!(!engine.validate_key("  ").await);
    }

    #[test]
    fn test_models_follow_allow_list() {
        let ids: Vec<String> = engine().models().iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, RagConfig::default().generation.allowed_models);
    }
}
