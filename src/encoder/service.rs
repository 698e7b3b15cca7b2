// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! The four encode operations
//!
//! Each operation times itself from entry to envelope construction. For
//! images that window covers fetch, decode, preprocess, inference and
//! normalization.

use ndarray::{Array2, Array3, Axis};
use std::time::Instant;
use tracing::debug;

use super::context::EncoderContext;
use super::errors::EncodeError;
use super::response::{BatchEncodeResult, EmbeddingKind, EncodeResult};
use crate::embeddings::l2_normalize;
use crate::embeddings::preprocessing::stack_batch;
use crate::imaging::decode_image_bytes;

/// Embed one text
pub async fn encode_text(ctx: &EncoderContext, text: &str) -> Result<EncodeResult, EncodeError> {
    let start = Instant::now();
    let embedder = ctx.text_embedder();

    let vector = embedder.embed(text).await.map_err(EncodeError::Inference)?;

    Ok(EncodeResult::new(
        vector,
        embedder.model_id(),
        EmbeddingKind::Text,
        start.elapsed(),
    ))
}

/// Embed several texts in one provider call
pub async fn encode_batch_text(
    ctx: &EncoderContext,
    texts: &[String],
) -> Result<BatchEncodeResult, EncodeError> {
    if texts.is_empty() {
        return Err(EncodeError::validation("texts list cannot be empty"));
    }

    let start = Instant::now();
    let embedder = ctx.text_embedder();

    let vectors = embedder
        .embed_batch(texts)
        .await
        .map_err(EncodeError::Inference)?;
    if vectors.len() != texts.len() {
        return Err(EncodeError::Inference(anyhow::anyhow!(
            "Text model returned {} vectors for {} inputs",
            vectors.len(),
            texts.len()
        )));
    }
    debug!("Encoded {} texts", texts.len());

    Ok(BatchEncodeResult::new(
        vectors,
        embedder.dimension(),
        embedder.model_id(),
        EmbeddingKind::Text,
        start.elapsed(),
    ))
}

/// Fetch, decode and embed one image
pub async fn encode_image(
    ctx: &EncoderContext,
    image_url: &str,
) -> Result<EncodeResult, EncodeError> {
    let start = Instant::now();
    let embedder = ctx.image_embedder();

    let pixels = load_pixels(ctx, image_url).await?.insert_axis(Axis(0));
    let rows = embedder
        .embed_batch(pixels)
        .await
        .map_err(EncodeError::Inference)?;

    let vector = normalize_rows(rows)
        .into_iter()
        .next()
        .ok_or_else(|| EncodeError::Inference(anyhow::anyhow!("Image model returned no rows")))?;

    Ok(EncodeResult::new(
        vector,
        embedder.model_id(),
        EmbeddingKind::Image,
        start.elapsed(),
    ))
}

/// Fetch every image in order, then embed all of them in one forward pass
///
/// The first failing URL fails the whole batch.
pub async fn encode_batch_images(
    ctx: &EncoderContext,
    image_urls: &[String],
) -> Result<BatchEncodeResult, EncodeError> {
    if image_urls.is_empty() {
        return Err(EncodeError::validation("image_urls list cannot be empty"));
    }

    let start = Instant::now();
    let embedder = ctx.image_embedder();

    let mut tensors = Vec::with_capacity(image_urls.len());
    for url in image_urls {
        tensors.push(load_pixels(ctx, url).await?);
    }

    let batch = stack_batch(&tensors).map_err(EncodeError::Inference)?;
    let rows = embedder
        .embed_batch(batch)
        .await
        .map_err(EncodeError::Inference)?;
    if rows.nrows() != image_urls.len() {
        return Err(EncodeError::Inference(anyhow::anyhow!(
            "Image model returned {} rows for {} images",
            rows.nrows(),
            image_urls.len()
        )));
    }
    debug!("Encoded {} images", image_urls.len());

    Ok(BatchEncodeResult::new(
        normalize_rows(rows),
        embedder.dimension(),
        embedder.model_id(),
        EmbeddingKind::Image,
        start.elapsed(),
    ))
}

async fn load_pixels(ctx: &EncoderContext, url: &str) -> Result<Array3<f32>, EncodeError> {
    let bytes = ctx.fetcher().fetch(url).await?;
    let image = decode_image_bytes(&bytes)?;
    Ok(ctx.image_embedder().preprocess(&image))
}

/// Converts model rows into unit-length vectors
fn normalize_rows(rows: Array2<f32>) -> Vec<Vec<f32>> {
    rows.outer_iter()
        .map(|row| {
            let mut vector = row.to_vec();
            l2_normalize(&mut vector);
            vector
        })
        .collect()
}
