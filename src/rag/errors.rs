// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the ingestion and retrieval pipelines
//!
//! Each upstream collaborator keeps its own variant so callers can tell an
//! embedding outage from an index or model failure, even though the HTTP
//! boundary reports all of them the same way.

use thiserror::Error;

use super::chunker::ChunkError;
use crate::embeddings::EmbeddingError;
use crate::generation::GenerationError;
use crate::vector::IndexError;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector index failed: {0}")]
    Index(#[from] IndexError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Chunks stored before the failure stay in the index
    #[error("Ingestion stopped after {stored} of {total} chunks: {source}")]
    PartialIngest {
        stored: usize,
        total: usize,
        #[source]
        source: Box<RagError>,
    },

    #[error("Invalid chunking parameters: {0}")]
    Chunking(#[from] ChunkError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl RagError {
    /// The collaborator failure underneath any partial-ingest wrapper
    pub fn root(&self) -> &RagError {
        match self {
            RagError::PartialIngest { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type RagResult<T> = std::result::Result<T, RagError>;
