// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use support_rag_node::{api, config::AppConfig, version};
use tracing::info;

/// Support RAG node: document ingestion and grounded question answering
#[derive(Parser, Debug)]
#[command(name = "support-rag-node", version = version::VERSION_NUMBER)]
struct Args {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    info!("Starting {}", version::get_version_string());

    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    info!(
        "Vector index {} (collection {}), chat model {}",
        config.index.url, config.index.collection, config.generation.model
    );

    let state = api::AppState::from_config(&config).await?;
    if let Err(e) = state.services.ingestion.ensure_collection().await {
        // Not fatal: the collection is created again on first use
        tracing::warn!("Could not prepare vector collection: {}", e);
    }

    api::start_server(state, &config.server.bind_addr).await
}
