// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector index
//!
//! The corpus is append-only: points are created at ingestion and never
//! updated or deleted. [`VectorIndex`] is implemented against a Qdrant
//! server ([`QdrantIndex`]) and in process ([`InMemoryIndex`]).

pub mod memory;
pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryIndex;
pub use qdrant::QdrantIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
}

impl Distance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "Cosine",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: String,
    pub dimension: usize,
    pub distance: Distance,
}

impl CollectionSpec {
    pub fn cosine(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            distance: Distance::Cosine,
        }
    }
}

/// Provenance stored next to each chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(
        default,
        rename = "uploadedBy",
        skip_serializing_if = "Option::is_none"
    )]
    pub uploader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    /// Caller-supplied fields carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChunkMetadata {
    pub fn new(filename: &str, uploader: &str, uploaded_at: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            uploader: Some(uploader.to_string()),
            uploaded_at: Some(uploaded_at.to_string()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: PointPayload,
}

/// A point read back without its vector
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
    pub id: String,
    pub payload: PointPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub name: String,
    pub points_count: u64,
    pub status: String,
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Vector index unavailable: {0}")]
    Unavailable(String),

    #[error("Vector index rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Vector has {actual} dimensions, collection expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Malformed index response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if it does not exist yet
    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<(), IndexError>;

    /// Store every point or none of them
    async fn upsert(&self, collection: &str, points: Vec<IndexedPoint>) -> Result<(), IndexError>;

    /// Up to `k` nearest points, most similar first
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredPoint>, IndexError>;

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo, IndexError>;

    /// Read up to `limit` stored points with payloads
    async fn scroll(&self, collection: &str, limit: usize) -> Result<Vec<StoredPoint>, IndexError>;
}
