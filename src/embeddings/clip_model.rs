// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CLIP ViT-B-32 vision tower (OpenCLIP laion2b_s34b_b79k weights)
//!
//! Takes NCHW pixel batches produced by [`preprocess_clip`] and returns one
//! 512-d projected image embedding per row. Rows are returned as the model
//! emits them; normalization happens in the encoder.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use ndarray::{Array2, Array3, Array4, Ix2};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::{preprocess_clip, CLIP_INPUT_SIZE};
use super::{build_session, Device, ImageEmbedder};
use crate::version::{IMAGE_DIMENSIONS, IMAGE_MODEL_ID};

/// Output name used by transformers-style CLIP vision exports
const IMAGE_EMBEDS_OUTPUT: &str = "image_embeds";

#[derive(Clone)]
pub struct OnnxClipModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    output_name: String,
    dimension: usize,
    device: Device,
}

impl std::fmt::Debug for OnnxClipModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClipModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("dimension", &self.dimension)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl OnnxClipModel {
    /// Load the vision tower and check it emits 512-d embeddings
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - A validation pass does not return [1, 512]
    pub async fn load<P: AsRef<Path>>(
        model_path: P,
        use_gpu: bool,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        info!("Loading CLIP vision encoder from {}", model_path.display());

        let (session, device) = build_session(model_path, use_gpu, intra_threads)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "pixel_values".to_string());

        // Prefer the projected embedding output when the export has several
        let output_name = session
            .outputs
            .iter()
            .find(|output| output.name == IMAGE_EMBEDS_OUTPUT)
            .or_else(|| session.outputs.first())
            .map(|output| output.name.clone())
            .ok_or_else(|| anyhow!("CLIP model declares no outputs"))?;

        debug!(
            "CLIP encoder loaded - input: {}, output: {}",
            input_name, output_name
        );

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_name,
            dimension: IMAGE_DIMENSIONS,
            device,
        };

        let size = CLIP_INPUT_SIZE as usize;
        let probe = model
            .embed_batch(Array4::zeros((1, 3, size, size)))
            .await
            .context("Validation inference failed")?;
        if probe.shape() != [1, IMAGE_DIMENSIONS] {
            anyhow::bail!(
                "CLIP model outputs unexpected shape {:?} (expected [1, {}])",
                probe.shape(),
                IMAGE_DIMENSIONS
            );
        }

        info!("✅ CLIP encoder loaded on {} ({}D embeddings)", device, IMAGE_DIMENSIONS);
        Ok(model)
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

#[async_trait]
impl ImageEmbedder for OnnxClipModel {
    fn model_id(&self) -> &str {
        IMAGE_MODEL_ID
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn preprocess(&self, image: &DynamicImage) -> Array3<f32> {
        preprocess_clip(image)
    }

    async fn embed_batch(&self, pixels: Array4<f32>) -> Result<Array2<f32>> {
        let shape = pixels.shape().to_vec();
        if shape.len() != 4 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [N, 3, H, W]", shape);
        }
        debug!("Running CLIP inference on batch of {}", shape[0]);

        let session = Arc::clone(&self.session);
        let input_name = self.input_name.clone();
        let output_name = self.output_name.clone();

        tokio::task::spawn_blocking(move || -> Result<Array2<f32>> {
            let mut session = session
                .lock()
                .map_err(|_| anyhow!("CLIP session lock poisoned"))?;

            let input_value =
                Value::from_array(pixels).context("Failed to create input tensor")?;
            let outputs = session
                .run(ort::inputs![input_name.as_str() => input_value])
                .context("CLIP inference failed")?;

            let embeddings = outputs[output_name.as_str()]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?
                .to_owned()
                .into_dimensionality::<Ix2>()
                .context("Expected image embeddings shaped [batch, dim]")?;
            Ok(embeddings)
        })
        .await
        .context("Image inference task failed")?
    }
}
