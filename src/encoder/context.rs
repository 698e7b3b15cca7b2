// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide encoder state

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::response::{HealthStatus, ModelNames};
use crate::config::EncoderConfig;
use crate::embeddings::{Device, ImageEmbedder, OnnxClipModel, OnnxTextModel, TextEmbedder};
use crate::imaging::ImageFetcher;

/// Loaded models and the image fetcher
///
/// Built once before any request is served and never mutated afterwards.
/// Share it as `Arc<EncoderContext>`.
#[derive(Clone)]
pub struct EncoderContext {
    text: Arc<dyn TextEmbedder>,
    image: Arc<dyn ImageEmbedder>,
    fetcher: ImageFetcher,
    device: Device,
}

impl std::fmt::Debug for EncoderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderContext")
            .field("text_model", &self.text.model_id())
            .field("image_model", &self.image.model_id())
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl EncoderContext {
    pub fn new(
        text: Arc<dyn TextEmbedder>,
        image: Arc<dyn ImageEmbedder>,
        fetcher: ImageFetcher,
        device: Device,
    ) -> Self {
        Self {
            text,
            image,
            fetcher,
            device,
        }
    }

    /// Load both ONNX models described by `config`
    ///
    /// Any failure here is fatal to startup.
    pub async fn load(config: &EncoderConfig) -> Result<Self> {
        info!("[1/2] Loading sentence transformer...");
        let start = Instant::now();
        let text = OnnxTextModel::load(
            &config.text_model_path,
            &config.text_tokenizer_path,
            config.use_gpu,
            config.intra_threads,
        )
        .await
        .context("Failed to load text model")?;
        info!(
            "✓ Loaded in {:.2}s (dimensions: {})",
            start.elapsed().as_secs_f64(),
            text.dimension()
        );

        info!("[2/2] Loading CLIP image encoder...");
        let start = Instant::now();
        let image = OnnxClipModel::load(&config.image_model_path, config.use_gpu, config.intra_threads)
            .await
            .context("Failed to load image model")?;
        info!(
            "✓ Loaded in {:.2}s (dimensions: {})",
            start.elapsed().as_secs_f64(),
            image.dimension()
        );

        let device = match (text.device(), image.device()) {
            (Device::Cuda, Device::Cuda) => Device::Cuda,
            (Device::Cpu, Device::Cpu) => Device::Cpu,
            (text_device, image_device) => {
                warn!(
                    "Models placed on different devices (text: {}, image: {}), reporting cpu",
                    text_device, image_device
                );
                Device::Cpu
            }
        };

        let fetcher = ImageFetcher::new(config.fetch_timeout())?;

        Ok(Self::new(Arc::new(text), Arc::new(image), fetcher, device))
    }

    pub fn text_embedder(&self) -> &dyn TextEmbedder {
        self.text.as_ref()
    }

    pub fn image_embedder(&self) -> &dyn ImageEmbedder {
        self.image.as_ref()
    }

    pub fn fetcher(&self) -> &ImageFetcher {
        &self.fetcher
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ready",
            device: self.device,
            models: ModelNames {
                text: self.text.model_id().to_string(),
                image: self.image.model_id().to_string(),
            },
        }
    }
}
