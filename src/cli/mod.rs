// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod download;
pub mod invoke;
pub mod probe;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Vector encoder CLI
#[derive(Parser, Debug)]
#[command(name = "vector-encoder-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Model pre-fetch, single-call invocation and service probing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download model weights and tokenizer into the models directory
    Download(download::DownloadArgs),

    /// Handle a single {"input": ...} event and print the JSON reply
    Invoke(invoke::InvokeArgs),

    /// Exercise every route of a running service
    Probe(probe::ProbeArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Download(args) => download::download_models(args).await,
        Commands::Invoke(args) => invoke::invoke(args).await,
        Commands::Probe(args) => probe::probe(args).await,
    }
}
