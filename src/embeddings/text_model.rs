// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX sentence transformer (all-MiniLM-L6-v2)
//!
//! Reproduces the sentence-transformers pipeline of the model:
//! - BERT WordPiece tokenization, truncated to 256 tokens, padded to the
//!   longest sequence of the batch
//! - Transformer forward pass in ONNX Runtime
//! - Attention-masked mean pooling over token embeddings
//! - L2 normalization
//!
//! Output vectors have 384 dimensions.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Ix3};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::{build_session, l2_normalize, Device, TextEmbedder};
use crate::version::{TEXT_DIMENSIONS, TEXT_MODEL_ID};

/// Maximum number of tokens fed to the model per text
pub const MAX_SEQUENCE_LENGTH: usize = 256;

/// Sentence transformer backed by ONNX Runtime
///
/// The session sits behind a `Mutex`: inference calls on one model run one at
/// a time.
#[derive(Clone)]
pub struct OnnxTextModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    dimension: usize,
    device: Device,
}

impl std::fmt::Debug for OnnxTextModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxTextModel")
            .field("dimension", &self.dimension)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

/// Token tensors for one batch, all shaped [batch, seq_len]
struct TokenBatch {
    input_ids: Array2<i64>,
    attention_mask: Array2<i64>,
    token_type_ids: Array2<i64>,
}

impl OnnxTextModel {
    /// Loads the model and tokenizer, then runs one validation inference
    ///
    /// # Errors
    /// Fails if either file is missing, ONNX Runtime cannot build a session,
    /// or the model does not produce 384-wide token embeddings.
    pub async fn load<P: AsRef<Path>>(
        model_path: P,
        tokenizer_path: P,
        use_gpu: bool,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("Loading sentence transformer from {}", model_path.display());
        let (session, device) = build_session(model_path, use_gpu, intra_threads)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            dimension: TEXT_DIMENSIONS,
            device,
        };

        let probe = model
            .embed("validation test")
            .await
            .context("Validation inference failed")?;
        if probe.len() != TEXT_DIMENSIONS {
            anyhow::bail!(
                "Model outputs unexpected dimensions: {} (expected {})",
                probe.len(),
                TEXT_DIMENSIONS
            );
        }

        info!("✅ Sentence transformer loaded on {} ({}D)", device, TEXT_DIMENSIONS);
        Ok(model)
    }

    pub fn device(&self) -> Device {
        self.device
    }

    fn tokenize(&self, texts: &[String]) -> Result<TokenBatch> {
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let encodings = self
            .tokenizer
            .encode_batch(inputs, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);
        let batch = encodings.len();

        let mut input_ids = Vec::with_capacity(batch * seq_len);
        let mut attention_mask = Vec::with_capacity(batch * seq_len);
        let mut token_type_ids = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            input_ids.extend(encoding.get_ids().iter().map(|&v| v as i64));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&v| v as i64));
            token_type_ids.extend(encoding.get_type_ids().iter().map(|&v| v as i64));
        }

        Ok(TokenBatch {
            input_ids: Array2::from_shape_vec((batch, seq_len), input_ids)
                .context("Failed to create input_ids array")?,
            attention_mask: Array2::from_shape_vec((batch, seq_len), attention_mask)
                .context("Failed to create attention_mask array")?,
            token_type_ids: Array2::from_shape_vec((batch, seq_len), token_type_ids)
                .context("Failed to create token_type_ids array")?,
        })
    }

    /// Runs the transformer and returns token embeddings [batch, seq_len, hidden]
    async fn forward(&self, tokens: TokenBatch) -> Result<(Array3<f32>, Array2<i64>)> {
        let session = Arc::clone(&self.session);
        let mask = tokens.attention_mask.clone();

        let hidden = tokio::task::spawn_blocking(move || -> Result<Array3<f32>> {
            let mut session = session
                .lock()
                .map_err(|_| anyhow!("Text model session lock poisoned"))?;
            let outputs = session.run(ort::inputs![
                "input_ids" => Value::from_array(tokens.input_ids)?,
                "attention_mask" => Value::from_array(tokens.attention_mask)?,
                "token_type_ids" => Value::from_array(tokens.token_type_ids)?
            ])?;

            // Index 0 rather than a name: exports differ in output naming
            let hidden = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?
                .to_owned()
                .into_dimensionality::<Ix3>()
                .context("Expected token embeddings shaped [batch, seq_len, hidden]")?;
            Ok(hidden)
        })
        .await
        .context("Text inference task failed")??;

        Ok((hidden, mask))
    }
}

#[async_trait]
impl TextEmbedder for OnnxTextModel {
    fn model_id(&self) -> &str {
        TEXT_MODEL_ID
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow!("Model returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let tokens = self.tokenize(texts)?;
        debug!(
            "Running text inference: batch={}, seq_len={}",
            texts.len(),
            tokens.input_ids.ncols()
        );
        let (hidden, mask) = self.forward(tokens).await?;

        let mut vectors = mean_pool(hidden.view(), mask.view());
        for (i, vector) in vectors.iter_mut().enumerate() {
            if vector.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    i,
                    vector.len(),
                    self.dimension
                );
            }
            l2_normalize(vector);
        }
        Ok(vectors)
    }
}

/// Averages token embeddings over positions where the attention mask is set
///
/// `hidden` is [batch, seq_len, hidden_dim], `mask` is [batch, seq_len].
pub fn mean_pool(hidden: ArrayView3<f32>, mask: ArrayView2<i64>) -> Vec<Vec<f32>> {
    hidden
        .axis_iter(Axis(0))
        .zip(mask.axis_iter(Axis(0)))
        .map(|(tokens, item_mask)| {
            let mut pooled = vec![0.0f32; tokens.ncols()];
            let mut weight = 0.0f32;
            for (token, &m) in tokens.axis_iter(Axis(0)).zip(item_mask.iter()) {
                if m == 0 {
                    continue;
                }
                weight += 1.0;
                for (acc, value) in pooled.iter_mut().zip(token.iter()) {
                    *acc += value;
                }
            }
            let weight = weight.max(1e-9);
            pooled.iter_mut().for_each(|v| *v /= weight);
            pooled
        })
        .collect()
}
