// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod generation;
pub mod rag;
pub mod users;
pub mod vector;
pub mod version;

// Re-export main types
pub use api::{create_app, start_server, ApiError, AppState};
pub use auth::{AuthGate, Identity, Role, TokenCodec};
pub use config::AppConfig;
pub use embeddings::{Embedder, EmbeddingError};
pub use generation::{ChatModel, GenerationError};
pub use rag::{IngestionPipeline, RagError, RagServices, RetrievalPipeline};
pub use users::{User, UserRepository};
pub use vector::{IndexError, VectorIndex};
