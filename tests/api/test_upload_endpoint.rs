// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;

use super::support::*;

#[tokio::test]
async fn test_pdf_upload_is_indexed() {
    let t = test_app().await;
    let token = register(&t.app, "Alice", "a@x.com", "pw").await;
    let text = "Our support line is open weekdays from nine to five. ".repeat(12);

    let (status, body) = upload_pdf(&t.app, &token, "hours.pdf", &text).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Document processed successfully");
    assert_eq!(body["filename"], "hours.pdf");

    let chunks = body["chunks"].as_u64().unwrap() as usize;
    assert!(chunks > 1);
    assert_eq!(t.index.len(COLLECTION).await, chunks);
    assert_eq!(t.extractions(), 1);
    assert_eq!(t.embed_calls(), chunks);
}

#[tokio::test]
async fn test_non_pdf_is_rejected_without_indexing() {
    let t = test_app().await;
    let token = register(&t.app, "Alice", "a@x.com", "pw").await;

    let body = multipart_body("file", "notes.txt", "text/plain", b"just some notes");
    let (status, body) = send(&t.app, upload_request(body, Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PDF files are supported");
    assert_eq!(t.index.len(COLLECTION).await, 0);

    // A .pdf name alone is not enough
    let body = multipart_body("file", "notes.pdf", "application/pdf", b"just some notes");
    let (status, _) = send(&t.app, upload_request(body, Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(t.index.len(COLLECTION).await, 0);
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let t = test_app().await;
    let token = register(&t.app, "Alice", "a@x.com", "pw").await;

    let text = "x".repeat(MAX_UPLOAD + 1024);
    let (status, body) = upload_pdf(&t.app, &token, "big.pdf", &text).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
    assert_eq!(t.extractions(), 0);
    assert_eq!(t.embed_calls(), 0);
    assert_eq!(t.index.len(COLLECTION).await, 0);
}

#[tokio::test]
async fn test_far_oversized_upload_is_refused_up_front() {
    let t = test_app().await;
    let token = register(&t.app, "Alice", "a@x.com", "pw").await;

    let text = "y".repeat(MAX_UPLOAD * 8);
    let (status, _) = upload_pdf(&t.app, &token, "huge.pdf", &text).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(t.extractions(), 0);
    assert_eq!(t.embed_calls(), 0);
    assert_eq!(t.index.len(COLLECTION).await, 0);
}

#[tokio::test]
async fn test_missing_file_field() {
    let t = test_app().await;
    let token = register(&t.app, "Alice", "a@x.com", "pw").await;

    let body = multipart_body("attachment", "faq.pdf", "application/pdf", &fake_pdf("hello"));
    let (status, body) = send(&t.app, upload_request(body, Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_pdf_without_text_is_rejected() {
    let t = test_app().await;
    let token = register(&t.app, "Alice", "a@x.com", "pw").await;
    let (status, _) = upload_pdf(&t.app, &token, "scan.pdf", "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(t.index.len(COLLECTION).await, 0);
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let t = test_app().await;
    let body = multipart_body("file", "faq.pdf", "application/pdf", &fake_pdf("hello"));
    let (status, body) = send(&t.app, upload_request(body, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
}
