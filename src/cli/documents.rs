// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;
use crate::rag::{PdfTextExtractor, RagServices, TextExtractor};
use crate::vector::ChunkMetadata;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// PDF file to ingest
    #[arg(long)]
    pub file: PathBuf,

    /// Email recorded as the uploader
    #[arg(long, default_value = "cli@localhost")]
    pub uploader: String,
}

/// Arguments for the ask command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    /// Number of chunks to retrieve (defaults to RETRIEVAL_TOP_K)
    #[arg(long)]
    pub k: Option<usize>,
}

pub async fn init_index(services: &RagServices) -> Result<()> {
    services
        .ingestion
        .ensure_collection()
        .await
        .context("Failed to create vector collection")?;
    let collection = services.ingestion.collection();
    println!(
        "Collection {} ready ({} dims, {})",
        collection.name,
        collection.dimension,
        collection.distance.as_str()
    );
    Ok(())
}

pub async fn ingest(services: &RagServices, args: IngestArgs) -> Result<()> {
    let filename = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid file path {}", args.file.display()))?
        .to_string();
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let extractor = PdfTextExtractor;
    if !extractor.accepts(&filename, None, &bytes) {
        return Err(anyhow!("{} is not a PDF file", filename));
    }
    let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
        .await
        .context("Extraction task failed")??;
    info!("Extracted {} characters from {}", text.len(), filename);

    let metadata = ChunkMetadata::new(&filename, &args.uploader, &Utc::now().to_rfc3339());
    let report = services.ingestion.ingest(&text, metadata).await?;

    println!(
        "Ingested {} ({} chunks, {} blank skipped)",
        filename, report.chunk_count, report.skipped_blank
    );
    Ok(())
}

pub async fn ask(services: &RagServices, config: &AppConfig, args: AskArgs) -> Result<()> {
    let k = args
        .k
        .unwrap_or(config.rag.top_k)
        .clamp(1, config.rag.max_top_k);
    let answer = services.retrieval.answer(&args.question, k).await?;
    println!("{}", answer);
    Ok(())
}
