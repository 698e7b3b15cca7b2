// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Reading one event and producing one reply

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::info;

use super::handle_event;
use crate::encoder::EncoderContext;

/// Where the single event comes from
#[derive(Debug, Clone, PartialEq)]
pub enum EventSource {
    /// Event JSON passed directly
    Inline(String),
    /// Path to a file holding the event JSON
    File(PathBuf),
    /// Event JSON read from standard input until EOF
    Stdin,
}

/// Read and parse the event
pub async fn read_event(source: &EventSource) -> Result<Value> {
    let raw = match source {
        EventSource::Inline(raw) => raw.clone(),
        EventSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        EventSource::Stdin => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read event from stdin")?;
            raw
        }
    };

    serde_json::from_str(&raw).context("Event is not valid JSON")
}

/// Read one event from `source` and return the reply for it
pub async fn run_once(ctx: &EncoderContext, source: &EventSource) -> Result<Value> {
    let event = read_event(source).await?;
    let reply = handle_event(ctx, &event).await;

    if reply.get("error").is_some() {
        info!("Event handled with error reply");
    } else {
        info!("Event handled");
    }
    Ok(reply)
}
