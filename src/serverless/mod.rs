// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-invocation adapter
//!
//! A task runner hands over one event of the form `{"input": {...}}` and
//! expects exactly one JSON object back: a result envelope or an error
//! envelope. Errors are never raised to the runner.

pub mod runner;

use serde_json::{json, Value};
use tracing::error;

use crate::encoder::{route, EncoderContext};

pub use runner::{read_event, run_once, EventSource};

/// Handle one event and return the JSON reply
pub async fn handle_event(ctx: &EncoderContext, event: &Value) -> Value {
    let reply = match route(ctx, event.get("input")).await {
        Ok(response) => serde_json::to_value(response),
        Err(error_result) => serde_json::to_value(error_result),
    };

    reply.unwrap_or_else(|e| {
        error!("Failed to serialize reply: {}", e);
        json!({
            "error": format!("Processing failed: {}", e),
            "error_type": "SerializationError"
        })
    })
}
