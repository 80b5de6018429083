// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wiring of the RAG pipelines from configuration

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use super::catalog::DocumentCatalog;
use super::chunker::{ChunkError, TextSplitter};
use super::ingest::IngestionPipeline;
use super::retrieval::RetrievalPipeline;
use crate::config::{AppConfig, EmbeddingProvider, IndexConfig, RagConfig};
use crate::embeddings::{Embedder, HashingEmbedder, OpenAiEmbedder, RetryPolicy};
use crate::generation::{ChatModel, OpenAiChatModel};
use crate::vector::{CollectionSpec, QdrantIndex, VectorIndex};

/// The pipelines shared by the HTTP server and the operator CLI
#[derive(Clone)]
pub struct RagServices {
    pub ingestion: Arc<IngestionPipeline>,
    pub retrieval: Arc<RetrievalPipeline>,
    pub catalog: Arc<DocumentCatalog>,
}

impl RagServices {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        model: Arc<dyn ChatModel>,
        rag: &RagConfig,
        index_config: &IndexConfig,
    ) -> Result<Self, ChunkError> {
        let splitter = TextSplitter::new(rag.chunk_size, rag.chunk_overlap)?;
        let collection = CollectionSpec::cosine(&index_config.collection, index_config.dimension);

        Ok(Self {
            ingestion: Arc::new(IngestionPipeline::new(
                embedder.clone(),
                index.clone(),
                splitter,
                collection.clone(),
            )),
            retrieval: Arc::new(RetrievalPipeline::new(
                embedder,
                index.clone(),
                model,
                collection.name.clone(),
            )),
            catalog: Arc::new(DocumentCatalog::new(
                index,
                collection,
                index_config.scan_limit,
            )),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = match config.embedding.provider {
            EmbeddingProvider::OpenAi => {
                let retry = RetryPolicy {
                    max_retries: config.embedding.max_retries,
                    base_delay: config.embedding.retry_base_delay,
                    ..RetryPolicy::default()
                };
                Arc::new(
                    OpenAiEmbedder::new(
                        &config.embedding.base_url,
                        config.embedding.api_key.clone(),
                        &config.embedding.model,
                        config.index.dimension,
                        config.embedding.request_timeout,
                        retry,
                    )
                    .context("Failed to build embedding client")?,
                )
            }
            EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.index.dimension)),
        };
        info!(
            "Embeddings: {} ({} dims)",
            embedder.model_name(),
            embedder.dimension()
        );

        let index: Arc<dyn VectorIndex> = Arc::new(
            QdrantIndex::new(&config.index.url, config.index.api_key.clone())
                .context("Failed to build vector index client")?,
        );
        let model: Arc<dyn ChatModel> = Arc::new(
            OpenAiChatModel::new(
                &config.generation.base_url,
                config.generation.api_key.clone(),
                &config.generation.model,
                config.generation.temperature,
                config.generation.request_timeout,
            )
            .context("Failed to build chat model client")?,
        );

        Self::new(embedder, index, model, &config.rag, &config.index)
            .context("Invalid chunking configuration")
    }
}
