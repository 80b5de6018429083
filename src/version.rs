// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the support RAG node

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-18";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "pdf-ingestion",
    "overlapping-chunks",
    "remote-embeddings",
    "qdrant-index",
    "grounded-answers",
    "jwt-auth",
    "cookie-fallback",
    "sqlite-users",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Support RAG Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
