// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// RAG (Retrieval-Augmented Generation) module
// Document ingestion, grounded answering and the derived document catalog

pub mod catalog;
pub mod chunker;
pub mod errors;
pub mod extract;
pub mod ingest;
pub mod retrieval;
pub mod services;

pub use catalog::{CatalogView, ChunkSummary, DocumentCatalog, DocumentSummary};
pub use chunker::{Chunk, ChunkError, TextSplitter};
pub use errors::{RagError, RagResult};
pub use extract::{ExtractError, PdfTextExtractor, TextExtractor};
pub use ingest::{IngestReport, IngestionPipeline};
pub use retrieval::{RetrievalPipeline, FALLBACK_ANSWER};
pub use services::RagServices;
