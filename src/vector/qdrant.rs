// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Qdrant REST client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::{
    CollectionInfo, CollectionSpec, IndexError, IndexedPoint, PointPayload, ScoredPoint,
    StoredPoint, VectorIndex,
};

const SCROLL_PAGE: usize = 256;

pub struct QdrantIndex {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct WirePoint<'a> {
    id: String,
    vector: &'a [f32],
    payload: &'a PointPayload,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct SearchEntry {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<PointPayload>,
}

#[derive(Deserialize)]
struct ScrollResult {
    points: Vec<ScrollEntry>,
    #[serde(default)]
    next_page_offset: Option<Value>,
}

#[derive(Deserialize)]
struct ScrollEntry {
    id: Value,
    #[serde(default)]
    payload: Option<PointPayload>,
}

#[derive(Deserialize)]
struct CollectionResult {
    status: String,
    #[serde(default)]
    points_count: Option<u64>,
    #[serde(default)]
    vectors_count: Option<u64>,
}

impl QdrantIndex {
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self, IndexError> {
        reqwest::Url::parse(url)
            .map_err(|e| IndexError::Unavailable(format!("invalid URL {}: {}", url, e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| IndexError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{}", self.base_url, collection)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, IndexError> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))
    }

    async fn parse<T: for<'de> Deserialize<'de>>(
        response: Response,
        collection: &str,
    ) -> Result<T, IndexError> {
        let status = response.status();
        if !status.is_success() {
            return Err(error_for(status, collection, response.text().await.unwrap_or_default()));
        }
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;
        Ok(envelope.result)
    }
}

fn error_for(status: StatusCode, collection: &str, body: String) -> IndexError {
    match status {
        StatusCode::NOT_FOUND => IndexError::CollectionNotFound(collection.to_string()),
        s if s.is_server_error() => IndexError::Unavailable(format!("{}: {}", s, body)),
        s => IndexError::Rejected {
            status: s.as_u16(),
            message: body,
        },
    }
}

/// Qdrant ids are either unsigned integers or UUID strings
fn id_to_string(id: Value) -> String {
    match id {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<(), IndexError> {
        let url = self.collection_url(&spec.name);
        let existing = self.send(self.client.get(&url)).await?;
        if existing.status().is_success() {
            debug!("Collection {} already exists", spec.name);
            return Ok(());
        }
        if existing.status() != StatusCode::NOT_FOUND {
            let status = existing.status();
            return Err(error_for(status, &spec.name, existing.text().await.unwrap_or_default()));
        }

        let body = json!({
            "vectors": {
                "size": spec.dimension,
                "distance": spec.distance.as_str(),
            }
        });
        let response = self.send(self.client.put(&url).json(&body)).await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                info!(
                    "Created collection {} ({} dims, {})",
                    spec.name,
                    spec.dimension,
                    spec.distance.as_str()
                );
                Ok(())
            }
            // Lost a creation race with another writer
            StatusCode::CONFLICT => Ok(()),
            status => Err(error_for(status, &spec.name, response.text().await.unwrap_or_default())),
        }
    }

    async fn upsert(&self, collection: &str, points: Vec<IndexedPoint>) -> Result<(), IndexError> {
        if points.is_empty() {
            return Ok(());
        }
        let wire: Vec<WirePoint> = points
            .iter()
            .map(|p| WirePoint {
                id: p.id.to_string(),
                vector: &p.vector,
                payload: &p.payload,
            })
            .collect();

        let url = format!("{}/points", self.collection_url(collection));
        let response = self
            .send(
                self.client
                    .put(&url)
                    .query(&[("wait", "true")])
                    .json(&json!({ "points": wire })),
            )
            .await?;
        let _: Value = Self::parse(response, collection).await?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredPoint>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let url = format!("{}/points/search", self.collection_url(collection));
        let body = json!({
            "vector": vector,
            "limit": k,
            "with_payload": true,
        });
        let response = self.send(self.client.post(&url).json(&body)).await?;
        let entries: Vec<SearchEntry> = Self::parse(response, collection).await?;

        Ok(entries
            .into_iter()
            .map(|e| ScoredPoint {
                id: id_to_string(e.id),
                score: e.score,
                payload: e.payload.unwrap_or_default(),
            })
            .collect())
    }

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo, IndexError> {
        let response = self
            .send(self.client.get(self.collection_url(collection)))
            .await?;
        let result: CollectionResult = Self::parse(response, collection).await?;
        Ok(CollectionInfo {
            name: collection.to_string(),
            points_count: result.points_count.or(result.vectors_count).unwrap_or(0),
            status: result.status,
        })
    }

    async fn scroll(&self, collection: &str, limit: usize) -> Result<Vec<StoredPoint>, IndexError> {
        let url = format!("{}/points/scroll", self.collection_url(collection));
        let mut points = Vec::new();
        let mut offset: Option<Value> = None;

        while points.len() < limit {
            let mut body = json!({
                "limit": SCROLL_PAGE.min(limit - points.len()),
                "with_payload": true,
                "with_vector": false,
            });
            if let Some(offset) = offset.take() {
                body["offset"] = offset;
            }

            let response = self.send(self.client.post(&url).json(&body)).await?;
            let page: ScrollResult = Self::parse(response, collection).await?;
            points.extend(page.points.into_iter().map(|e| StoredPoint {
                id: id_to_string(e.id),
                payload: e.payload.unwrap_or_default(),
            }));

            match page.next_page_offset {
                Some(next) if !next.is_null() => offset = Some(next),
                _ => break,
            }
        }

        debug!("Scrolled {} points from {}", points.len(), collection);
        Ok(points)
    }
}
