// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use std::sync::atomic::Ordering;
use std::time::Duration;
use support_rag_node::embeddings::{Embedder, EmbeddingError, OpenAiEmbedder, RetryPolicy};

use super::fake_servers::{openai_router, spawn, OpenAiState};

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    }
}

async fn embedder(
    state: &std::sync::Arc<OpenAiState>,
    dimension: usize,
    retry: RetryPolicy,
) -> OpenAiEmbedder {
    let url = spawn(openai_router(state.clone())).await;
    OpenAiEmbedder::new(
        &url,
        Some("sk-test".to_string()),
        "text-embedding-3-small",
        dimension,
        Duration::from_secs(5),
        retry,
    )
    .unwrap()
}

#[tokio::test]
async fn test_embeds_with_model_and_bearer_key() {
    let state = OpenAiState::new(8);
    let embedder = embedder(&state, 8, fast_retry(0)).await;

    let vector = embedder.embed("reset my password").await.unwrap();
    assert_eq!(vector.len(), 8);

    let requests = state.requests.lock().unwrap();
    assert_eq!(requests[0]["model"], "text-embedding-3-small");
    assert_eq!(requests[0]["input"], "reset my password");
    assert_eq!(
        state.auth_headers.lock().unwrap()[0].as_deref(),
        Some("Bearer sk-test")
    );
}

#[tokio::test]
async fn test_transient_outage_is_retried() {
    let state = OpenAiState::new(4);
    state.fail_times(2, StatusCode::SERVICE_UNAVAILABLE);
    let embedder = embedder(&state, 4, fast_retry(3)).await;

    assert!(embedder.embed("hello").await.is_ok());
    assert_eq!(state.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let state = OpenAiState::new(4);
    state.fail_times(10, StatusCode::TOO_MANY_REQUESTS);
    let embedder = embedder(&state, 4, fast_retry(2)).await;

    assert!(matches!(
        embedder.embed("hello").await,
        Err(EmbeddingError::RateLimited { .. })
    ));
    assert_eq!(state.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_bad_credentials_are_not_retried() {
    let state = OpenAiState::new(4);
    state.fail_times(10, StatusCode::UNAUTHORIZED);
    let embedder = embedder(&state, 4, fast_retry(3)).await;

    assert!(matches!(
        embedder.embed("hello").await,
        Err(EmbeddingError::Unauthorized { status: 401 })
    ));
    assert_eq!(state.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dimension_mismatch_detected() {
    let state = OpenAiState::new(4);
    let embedder = embedder(&state, 1536, fast_retry(0)).await;

    assert!(matches!(
        embedder.embed("hello").await,
        Err(EmbeddingError::DimensionMismatch {
            expected: 1536,
            actual: 4
        })
    ));
}
