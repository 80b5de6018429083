// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod documents;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::rag::RagServices;

/// Support RAG operator CLI
#[derive(Parser, Debug)]
#[command(name = "support-rag-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Operator tools for the support RAG node", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the vector collection if it does not exist
    InitIndex,

    /// Extract, chunk and index a PDF
    Ingest(documents::IngestArgs),

    /// Answer a question from the indexed documents
    Ask(documents::AskArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let services = RagServices::from_config(&config)?;

    match cli.command {
        Commands::InitIndex => documents::init_index(&services).await,
        Commands::Ingest(args) => documents::ingest(&services, args).await,
        Commands::Ask(args) => documents::ask(&services, &config, args).await,
    }
}
