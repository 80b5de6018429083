// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document listing derived from stored chunks
//!
//! Documents are not stored as records of their own; they are rebuilt by
//! grouping points on `metadata.filename`.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::errors::RagResult;
use crate::vector::{CollectionInfo, CollectionSpec, StoredPoint, VectorIndex};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSummary {
    pub id: String,
    pub text: String,
    pub text_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub filename: String,
    pub chunks: Vec<ChunkSummary>,
    pub total_chunks: usize,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub collection: CollectionInfo,
    pub documents: Vec<DocumentSummary>,
}

pub struct DocumentCatalog {
    index: Arc<dyn VectorIndex>,
    collection: CollectionSpec,
    scan_limit: usize,
}

impl DocumentCatalog {
    pub fn new(index: Arc<dyn VectorIndex>, collection: CollectionSpec, scan_limit: usize) -> Self {
        Self {
            index,
            collection,
            scan_limit,
        }
    }

    pub async fn list(&self) -> RagResult<CatalogView> {
        self.index.ensure_collection(&self.collection).await?;
        let info = self.index.collection_info(&self.collection.name).await?;
        let points = self
            .index
            .scroll(&self.collection.name, self.scan_limit)
            .await?;

        Ok(CatalogView {
            collection: info,
            documents: group_by_filename(points),
        })
    }
}

/// Group in first-seen order
pub fn group_by_filename(points: Vec<StoredPoint>) -> Vec<DocumentSummary> {
    let mut documents: Vec<DocumentSummary> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for point in points {
        let metadata = &point.payload.metadata;
        let filename = metadata.filename.clone().unwrap_or_else(|| UNKNOWN.to_string());
        let position = *positions.entry(filename.clone()).or_insert_with(|| {
            documents.push(DocumentSummary {
                filename,
                chunks: Vec::new(),
                total_chunks: 0,
                uploaded_by: metadata.uploader.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                uploaded_at: metadata
                    .uploaded_at
                    .clone()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            });
            documents.len() - 1
        });

        let document = &mut documents[position];
        let text = point.payload.text;
        document.chunks.push(ChunkSummary {
            id: point.id,
            text_length: text.chars().count(),
            text,
        });
        document.total_chunks += 1;
    }
    documents
}
