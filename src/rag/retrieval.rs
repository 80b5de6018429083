// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query-time retrieval and grounded generation

use std::sync::Arc;
use tracing::{debug, info};

use super::errors::{RagError, RagResult};
use crate::embeddings::Embedder;
use crate::generation::ChatModel;
use crate::vector::{IndexError, ScoredPoint, VectorIndex};

pub const DEFAULT_TOP_K: usize = 4;

/// Returned verbatim by the model when the context lacks the answer
pub const FALLBACK_ANSWER: &str =
    "I don't have that information. Please contact support@yourdomain.com.";

pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

pub fn build_system_prompt(context: &str) -> String {
    format!(
        "You are a helpful customer support AI assistant. Answer the question using only \
         the context below. If the answer is not contained in the context, respond with \
         exactly: \"{}\"\n\nContext:\n{}",
        FALLBACK_ANSWER, context
    )
}

/// Join retrieved chunk texts in index order
pub fn assemble_context(hits: &[ScoredPoint]) -> String {
    hits.iter()
        .map(|hit| hit.payload.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    model: Arc<dyn ChatModel>,
    collection: String,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        model: Arc<dyn ChatModel>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            index,
            model,
            collection: collection.into(),
        }
    }

    /// Top `k` chunks for `query`, most similar first
    pub async fn retrieve(&self, query: &str, k: usize) -> RagResult<Vec<ScoredPoint>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::InvalidQuery("query is empty".to_string()));
        }

        let vector = self.embedder.embed(query).await?;
        match self.index.search(&self.collection, &vector, k).await {
            Ok(hits) => Ok(hits),
            // Nothing ingested yet
            Err(IndexError::CollectionNotFound(_)) => {
                debug!("Collection {} does not exist yet", self.collection);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn answer(&self, query: &str, k: usize) -> RagResult<String> {
        let hits = self.retrieve(query, k).await?;
        info!("Retrieved {} chunks for query", hits.len());

        let context = assemble_context(&hits);
        let system = build_system_prompt(&context);
        let answer = self.model.complete(&system, query.trim()).await?;
        Ok(answer)
    }
}
