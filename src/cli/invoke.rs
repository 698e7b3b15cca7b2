// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::EncoderConfig;
use crate::encoder::EncoderContext;
use crate::serverless::{run_once, EventSource};

/// Arguments for the invoke command
#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Event JSON, e.g. '{"input": {"text": "red leather shoes"}}'
    #[arg(conflicts_with = "file")]
    pub event: Option<String>,

    /// Read the event from a file instead (stdin when neither is given)
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Pretty-print the reply
    #[arg(long)]
    pub pretty: bool,
}

impl InvokeArgs {
    pub fn source(&self) -> EventSource {
        match (&self.event, &self.file) {
            (Some(raw), _) => EventSource::Inline(raw.clone()),
            (None, Some(path)) => EventSource::File(path.clone()),
            (None, None) => EventSource::Stdin,
        }
    }
}

/// Load the models, handle one event and print the reply on stdout
pub async fn invoke(args: InvokeArgs) -> Result<()> {
    let config = EncoderConfig::from_env()?;
    let ctx = EncoderContext::load(&config)
        .await
        .context("Model loading failed")?;

    let reply = run_once(&ctx, &args.source()).await?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&reply)?
    } else {
        serde_json::to_string(&reply)?
    };
    println!("{}", output);
    Ok(())
}
