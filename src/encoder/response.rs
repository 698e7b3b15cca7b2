// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response envelopes shared by both transports
//!
//! Field names are part of the public wire format:
//!
//! ```json
//! {
//!   "vector": [0.01, -0.03, ...],
//!   "dimensions": 384,
//!   "model": "sentence-transformers/all-MiniLM-L6-v2",
//!   "type": "text",
//!   "latency_ms": 12.34
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::embeddings::Device;
use crate::version::{IMAGE_MODEL_ID, TEXT_MODEL_ID};

/// Which encoder produced a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    Text,
    Image,
}

/// One embedding plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeResult {
    pub vector: Vec<f32>,
    /// Always equal to `vector.len()`
    pub dimensions: usize,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: EmbeddingKind,
    pub latency_ms: f64,
}

impl EncodeResult {
    pub fn new(vector: Vec<f32>, model: &str, kind: EmbeddingKind, elapsed: Duration) -> Self {
        Self {
            dimensions: vector.len(),
            vector,
            model: model.to_string(),
            kind,
            latency_ms: round2(elapsed_ms(elapsed)),
        }
    }
}

/// Embeddings for a batch, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEncodeResult {
    pub vectors: Vec<Vec<f32>>,
    /// Always equal to `vectors.len()`
    pub count: usize,
    pub dimensions: usize,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: EmbeddingKind,
    pub latency_ms: f64,
    pub avg_latency_per_item_ms: f64,
}

impl BatchEncodeResult {
    /// `dimensions` is taken from the vectors; `fallback_dimensions` only
    /// applies to an empty batch.
    pub fn new(
        vectors: Vec<Vec<f32>>,
        fallback_dimensions: usize,
        model: &str,
        kind: EmbeddingKind,
        elapsed: Duration,
    ) -> Self {
        let count = vectors.len();
        let dimensions = vectors.first().map(Vec::len).unwrap_or(fallback_dimensions);
        let latency = elapsed_ms(elapsed);
        Self {
            vectors,
            count,
            dimensions,
            model: model.to_string(),
            kind,
            latency_ms: round2(latency),
            avg_latency_per_item_ms: round2(latency / count.max(1) as f64),
        }
    }
}

/// Successful outcome of the router
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodeResponse {
    Single(EncodeResult),
    Batch(BatchEncodeResult),
}

/// Error envelope returned in place of a result
///
/// Only `error` is always present. Never carries partial results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_keys: Option<Vec<String>>,
}

impl ErrorResult {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}

/// Example of every accepted request shape
pub fn usage_examples() -> Value {
    json!({
        "single_text": {"text": "your text here"},
        "single_image": {"image_url": "https://example.com/image.jpg"},
        "batch_text": {"texts": ["text1", "text2"]},
        "batch_images": {"image_urls": ["url1", "url2"]}
    })
}

/// Identifiers of the two loaded models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNames {
    pub text: String,
    pub image: String,
}

impl Default for ModelNames {
    fn default() -> Self {
        Self {
            text: TEXT_MODEL_ID.to_string(),
            image: IMAGE_MODEL_ID.to_string(),
        }
    }
}

/// Body of the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub device: Device,
    pub models: ModelNames,
}

pub fn elapsed_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
