// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process vector index with brute-force cosine search

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    CollectionInfo, CollectionSpec, IndexError, IndexedPoint, ScoredPoint, StoredPoint,
    VectorIndex,
};

struct Collection {
    dimension: usize,
    points: Vec<IndexedPoint>,
}

#[derive(Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |c| c.points.len())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<(), IndexError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(spec.name.clone())
            .or_insert_with(|| Collection {
                dimension: spec.dimension,
                points: Vec::new(),
            });
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<IndexedPoint>) -> Result<(), IndexError> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| IndexError::CollectionNotFound(collection.to_string()))?;

        // Validate the whole batch before touching storage
        if let Some(bad) = points.iter().find(|p| p.vector.len() != target.dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: target.dimension,
                actual: bad.vector.len(),
            });
        }

        for point in points {
            match target.points.iter_mut().find(|p| p.id == point.id) {
                Some(existing) => *existing = point,
                None => target.points.push(point),
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredPoint>, IndexError> {
        let collections = self.collections.read().await;
        let target = collections
            .get(collection)
            .ok_or_else(|| IndexError::CollectionNotFound(collection.to_string()))?;
        if vector.len() != target.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: target.dimension,
                actual: vector.len(),
            });
        }

        let mut results: Vec<ScoredPoint> = target
            .points
            .iter()
            .map(|point| ScoredPoint {
                id: point.id.to_string(),
                score: cosine_similarity(vector, &point.vector),
                payload: point.payload.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo, IndexError> {
        let collections = self.collections.read().await;
        let target = collections
            .get(collection)
            .ok_or_else(|| IndexError::CollectionNotFound(collection.to_string()))?;
        Ok(CollectionInfo {
            name: collection.to_string(),
            points_count: target.points.len() as u64,
            status: "green".to_string(),
        })
    }

    async fn scroll(&self, collection: &str, limit: usize) -> Result<Vec<StoredPoint>, IndexError> {
        let collections = self.collections.read().await;
        let target = collections
            .get(collection)
            .ok_or_else(|| IndexError::CollectionNotFound(collection.to_string()))?;
        Ok(target
            .points
            .iter()
            .take(limit)
            .map(|p| StoredPoint {
                id: p.id.to_string(),
                payload: p.payload.clone(),
            })
            .collect())
    }
}
