// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;
use support_rag_node::{
    embeddings::{Embedder, HashingEmbedder},
    rag::{RagError, FALLBACK_ANSWER},
    vector::{ChunkMetadata, VectorIndex},
};

use super::doubles::*;

fn meta() -> ChunkMetadata {
    ChunkMetadata::new("kb.pdf", "ops@x.com", "2025-03-01T12:00:00+00:00")
}

const PASSAGES: &[&str] = &[
    "To reset your password, go to settings",
    "Invoices are emailed on the first business day of each month",
    "Our office is closed on public holidays",
    "Two factor authentication can be enabled from the security page",
];

#[tokio::test]
async fn test_self_retrieval() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(DIM));
    let index = memory_index();
    let ingest = ingestion(embedder.clone(), index.clone(), 500, 50);
    for passage in PASSAGES {
        ingest.ingest(passage, meta()).await.unwrap();
    }

    let pipeline = retrieval(embedder.clone(), index.clone(), Arc::new(RecordingModel::default()));
    for passage in PASSAGES {
        let hits = pipeline.retrieve(passage, 1).await.unwrap();
        assert_eq!(hits[0].payload.text, *passage);
        assert!(hits[0].score > 0.99);
    }
}

#[tokio::test]
async fn test_context_follows_index_order() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(DIM));
    let index = memory_index();
    let ingest = ingestion(embedder.clone(), index.clone(), 500, 50);
    for passage in PASSAGES {
        ingest.ingest(passage, meta()).await.unwrap();
    }

    let model = Arc::new(RecordingModel::default());
    let pipeline = retrieval(embedder.clone(), index.clone(), model.clone());
    let query = "how do I reset my password";
    let answer = pipeline.answer(query, 2).await.unwrap();
    assert_eq!(answer, "recorded");

    let hits = pipeline.retrieve(query, 2).await.unwrap();
    let prompts = model.prompts.lock().unwrap();
    let prompt = &prompts[0];
    assert!(prompt.contains(FALLBACK_ANSWER));
    let expected = format!("{}\n\n---\n\n{}", hits[0].payload.text, hits[1].payload.text);
    assert!(prompt.ends_with(&expected));
    assert_eq!(hits[0].payload.text, PASSAGES[0]);
}

#[tokio::test]
async fn test_empty_collection_proceeds_with_empty_context() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(DIM));
    let index = memory_index();
    index.ensure_collection(&spec()).await.unwrap();

    let model = Arc::new(RecordingModel::default());
    let pipeline = retrieval(embedder, index, model.clone());
    pipeline.answer("anything at all", 4).await.unwrap();

    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].ends_with("Context:\n"));
}

#[tokio::test]
async fn test_missing_collection_is_treated_as_empty() {
    let model = Arc::new(RecordingModel::default());
    let pipeline = retrieval(Arc::new(HashingEmbedder::new(DIM)), memory_index(), model.clone());
    assert_eq!(pipeline.answer("hello", 4).await.unwrap(), "recorded");
}

#[tokio::test]
async fn test_failures_stay_distinguishable() {
    let err = retrieval(
        Arc::new(FlakyEmbedder::new(0)),
        memory_index(),
        Arc::new(RecordingModel::default()),
    )
    .answer("hello", 4)
    .await
    .unwrap_err();
    assert!(matches!(err, RagError::Embedding(_)));

    let err = retrieval(
        Arc::new(HashingEmbedder::new(DIM)),
        Arc::new(DownIndex),
        Arc::new(RecordingModel::default()),
    )
    .answer("hello", 4)
    .await
    .unwrap_err();
    assert!(matches!(err, RagError::Index(_)));

    let err = retrieval(
        Arc::new(HashingEmbedder::new(DIM)),
        memory_index(),
        Arc::new(FailingModel),
    )
    .answer("hello", 4)
    .await
    .unwrap_err();
    assert!(matches!(err, RagError::Generation(_)));
}

#[tokio::test]
async fn test_blank_query_is_invalid() {
    let pipeline = retrieval(
        Arc::new(HashingEmbedder::new(DIM)),
        memory_index(),
        Arc::new(RecordingModel::default()),
    );
    assert!(matches!(
        pipeline.answer("  \n", 4).await,
        Err(RagError::InvalidQuery(_))
    ));
}
