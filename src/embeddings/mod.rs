// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding model providers
//!
//! Two capability traits describe what the encoder needs from a model:
//! - [`TextEmbedder`]: sentence text in, fixed-width vectors out
//! - [`ImageEmbedder`]: preprocessing of decoded images plus a batched
//!   forward pass over the stacked pixel tensor
//!
//! The ONNX Runtime implementations (`OnnxTextModel`, `OnnxClipModel`) are
//! loaded once at startup and shared behind `Arc` for the process lifetime.

pub mod clip_model;
pub mod preprocessing;
pub mod session;
pub mod text_model;

use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;
use ndarray::{Array2, Array3, Array4};
use serde::Serialize;
use std::fmt;

pub use clip_model::OnnxClipModel;
pub use session::build_session;
pub use text_model::OnnxTextModel;

/// Execution placement of a loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cuda => write!(f, "cuda"),
            Device::Cpu => write!(f, "cpu"),
        }
    }
}

/// Sentence-level text embedding capability
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Identifier reported in responses
    fn model_id(&self) -> &str;

    /// Width of every returned vector
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds every text in one call; output order matches input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Image embedding capability
///
/// `preprocess` owns the model's fixed resize/normalize transform and returns
/// a CHW tensor. `embed_batch` receives those tensors stacked along a new
/// leading axis and returns one raw (un-normalized) row per image.
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Identifier reported in responses
    fn model_id(&self) -> &str;

    /// Width of every returned vector
    fn dimension(&self) -> usize;

    fn preprocess(&self, image: &DynamicImage) -> Array3<f32>;

    async fn embed_batch(&self, pixels: Array4<f32>) -> Result<Array2<f32>>;
}

/// Scales `vector` in place to unit Euclidean length
///
/// A zero vector has no direction and is left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
