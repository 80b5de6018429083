// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::atomic::Ordering;
use std::sync::Arc;
use support_rag_node::vector::{
    ChunkMetadata, CollectionSpec, IndexError, IndexedPoint, PointPayload, QdrantIndex,
    VectorIndex,
};
use uuid::Uuid;

use super::fake_servers::{qdrant_router, spawn, QdrantState};

fn point(vector: Vec<f32>, text: &str, filename: &str) -> IndexedPoint {
    IndexedPoint {
        id: Uuid::new_v4(),
        vector,
        payload: PointPayload {
            text: text.to_string(),
            metadata: ChunkMetadata::new(filename, "ops@x.com", "2025-03-01T10:00:00Z"),
        },
    }
}

async fn fake(page_size: usize) -> (Arc<QdrantState>, QdrantIndex) {
    let state = QdrantState::with_page_size(page_size);
    let url = spawn(qdrant_router(state.clone())).await;
    let index = QdrantIndex::new(&url, Some("secret-key".to_string())).unwrap();
    (state, index)
}

#[tokio::test]
async fn test_ensure_collection_creates_once() {
    let (state, index) = fake(10).await;
    let spec = CollectionSpec::cosine("support_docs", 3);

    index.ensure_collection(&spec).await.unwrap();
    index.ensure_collection(&spec).await.unwrap();

    assert_eq!(state.creates.load(Ordering::SeqCst), 1);
    let collections = state.collections.lock().unwrap();
    assert_eq!(collections["support_docs"].size, 3);
}

#[tokio::test]
async fn test_api_key_sent_on_every_request() {
    let (state, index) = fake(10).await;
    index
        .ensure_collection(&CollectionSpec::cosine("docs", 2))
        .await
        .unwrap();

    let keys = state.api_keys.lock().unwrap();
    assert!(!keys.is_empty());
    assert!(keys.iter().all(|k| k.as_deref() == Some("secret-key")));
}

#[tokio::test]
async fn test_upsert_then_search_returns_payloads() {
    let (_state, index) = fake(10).await;
    index
        .ensure_collection(&CollectionSpec::cosine("docs", 2))
        .await
        .unwrap();
    index
        .upsert(
            "docs",
            vec![
                point(vec![0.0, 1.0], "billing", "billing.pdf"),
                point(vec![1.0, 0.0], "passwords", "account.pdf"),
            ],
        )
        .await
        .unwrap();

    let hits = index.search("docs", &[1.0, 0.0], 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].payload.text, "passwords");
    assert_eq!(hits[0].payload.metadata.filename.as_deref(), Some("account.pdf"));
    assert_eq!(hits[0].payload.metadata.uploader.as_deref(), Some("ops@x.com"));
    assert!(Uuid::parse_str(&hits[0].id).is_ok());
}

#[tokio::test]
async fn test_wrong_dimension_is_rejected() {
    let (_state, index) = fake(10).await;
    index
        .ensure_collection(&CollectionSpec::cosine("docs", 2))
        .await
        .unwrap();

    let result = index
        .upsert("docs", vec![point(vec![1.0, 0.0, 0.0], "x", "x.pdf")])
        .await;
    assert!(matches!(result, Err(IndexError::Rejected { status: 400, .. })));
}

#[tokio::test]
async fn test_missing_collection_maps_to_not_found() {
    let (_state, index) = fake(10).await;
    assert!(matches!(
        index.search("ghost", &[1.0], 3).await,
        Err(IndexError::CollectionNotFound(name)) if name == "ghost"
    ));
    assert!(matches!(
        index.collection_info("ghost").await,
        Err(IndexError::CollectionNotFound(_))
    ));
}

#[tokio::test]
async fn test_scroll_follows_page_offsets() {
    let (_state, index) = fake(2).await;
    index
        .ensure_collection(&CollectionSpec::cosine("docs", 2))
        .await
        .unwrap();
    let points: Vec<IndexedPoint> = (0..5)
        .map(|i| point(vec![1.0, i as f32], &format!("chunk {}", i), "faq.pdf"))
        .collect();
    index.upsert("docs", points).await.unwrap();

    let all = index.scroll("docs", 100).await.unwrap();
    let texts: Vec<&str> = all.iter().map(|p| p.payload.text.as_str()).collect();
    assert_eq!(texts, ["chunk 0", "chunk 1", "chunk 2", "chunk 3", "chunk 4"]);

    let limited = index.scroll("docs", 3).await.unwrap();
    assert_eq!(limited.len(), 3);

    let info = index.collection_info("docs").await.unwrap();
    assert_eq!(info.points_count, 5);
    assert_eq!(info.status, "green");
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let index = QdrantIndex::new("http://127.0.0.1:9", None).unwrap();
    assert!(matches!(
        index.collection_info("docs").await,
        Err(IndexError::Unavailable(_))
    ));
}
