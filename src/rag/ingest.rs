// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ingestion: chunk, embed and index a document
//!
//! Chunks are written one at a time. When a call fails partway through a
//! document the chunks already written stay in the index; there is no
//! rollback. The error reports how far ingestion got.
//!
//! Whitespace-only chunks (blank pages, layout padding) carry nothing to
//! embed and are skipped; the report counts them.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::chunker::TextSplitter;
use super::errors::{RagError, RagResult};
use crate::embeddings::Embedder;
use crate::vector::{ChunkMetadata, CollectionSpec, IndexedPoint, PointPayload, VectorIndex};

#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Ids of the stored points, in chunk order
    pub point_ids: Vec<Uuid>,
    /// Chunks stored in the index
    pub chunk_count: usize,
    /// Whitespace-only chunks left out
    pub skipped_blank: usize,
}

pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    splitter: TextSplitter,
    collection: CollectionSpec,
}

impl IngestionPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        splitter: TextSplitter,
        collection: CollectionSpec,
    ) -> Self {
        Self {
            embedder,
            index,
            splitter,
            collection,
        }
    }

    pub fn collection(&self) -> &CollectionSpec {
        &self.collection
    }

    pub async fn ensure_collection(&self) -> RagResult<()> {
        self.index.ensure_collection(&self.collection).await?;
        Ok(())
    }

    pub async fn ingest(&self, raw_text: &str, metadata: ChunkMetadata) -> RagResult<IngestReport> {
        self.ensure_collection().await?;

        let (chunks, blank): (Vec<_>, Vec<_>) = self
            .splitter
            .split(raw_text)
            .into_iter()
            .partition(|c| !c.text.trim().is_empty());
        let total = chunks.len();
        let filename = metadata.filename.clone().unwrap_or_default();
        debug!(
            "Ingesting {}: {} chunks ({} blank skipped)",
            filename,
            total,
            blank.len()
        );

        let mut point_ids = Vec::with_capacity(total);
        for chunk in chunks {
            let id = Uuid::new_v4();
            let stored = point_ids.len();
            let step = async {
                let vector = self.embedder.embed(&chunk.text).await?;
                let point = IndexedPoint {
                    id,
                    vector,
                    payload: PointPayload {
                        text: chunk.text,
                        metadata: metadata.clone(),
                    },
                };
                self.index.upsert(&self.collection.name, vec![point]).await?;
                Ok::<_, RagError>(())
            };

            if let Err(e) = step.await {
                warn!(
                    "Ingestion of {} stopped at chunk {}/{}: {}",
                    filename,
                    stored + 1,
                    total,
                    e
                );
                return Err(if stored == 0 {
                    e
                } else {
                    RagError::PartialIngest {
                        stored,
                        total,
                        source: Box::new(e),
                    }
                });
            }
            point_ids.push(id);
        }

        info!(
            "Ingested {} into {} ({} chunks)",
            filename, self.collection.name, total
        );
        Ok(IngestReport {
            point_ids,
            chunk_count: total,
            skipped_blank: blank.len(),
        })
    }
}
