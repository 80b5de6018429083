// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;

use super::support::*;

#[tokio::test]
async fn test_empty_catalog() {
    let t = test_app().await;
    let token = register(&t.app, "Alice", "a@x.com", "pw").await;

    let (status, body) = send(&t.app, get_request("/documents", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collection"]["name"], COLLECTION);
    assert_eq!(body["collection"]["pointsCount"], 0);
    assert!(body["collection"]["status"].is_string());
    assert_eq!(body["documents"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_documents_grouped_by_filename() {
    let t = test_app().await;
    let token = register(&t.app, "Alice", "a@x.com", "pw").await;
    let long = "Refunds are processed within five business days. ".repeat(10);

    let (_, first) = upload_pdf(&t.app, &token, "refunds.pdf", &long).await;
    upload_pdf(&t.app, &token, "hours.pdf", "We are open weekdays.").await;

    let (status, body) = send(&t.app, get_request("/documents", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["filename"], "refunds.pdf");
    assert_eq!(documents[0]["totalChunks"], first["chunks"]);
    assert_eq!(documents[0]["uploadedBy"], "a@x.com");
    assert!(documents[0]["uploadedAt"].as_str().unwrap().contains('T'));

    let chunk = &documents[1]["chunks"][0];
    assert_eq!(chunk["text"], "We are open weekdays.");
    assert_eq!(chunk["textLength"], 21);
    assert!(chunk["id"].is_string());

    let total = first["chunks"].as_u64().unwrap() + 1;
    assert_eq!(body["collection"]["pointsCount"], total);
}
