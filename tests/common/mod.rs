// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for integration tests
//!
//! - Deterministic fake providers so encoder behavior can be tested without
//!   model files
//! - A local HTTP server serving generated images

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::{Array2, Array3, Array4, Axis};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use vector_encoder::embeddings::preprocessing::preprocess_clip;
use vector_encoder::embeddings::{l2_normalize, Device, ImageEmbedder, TextEmbedder};
use vector_encoder::imaging::ImageFetcher;
use vector_encoder::version::{IMAGE_DIMENSIONS, IMAGE_MODEL_ID, TEXT_DIMENSIONS, TEXT_MODEL_ID};
use vector_encoder::EncoderContext;

/// Text embedder producing a unit vector derived from a hash of the text
pub struct FakeTextEmbedder;

impl FakeTextEmbedder {
    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in text.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }

        // Linear congruential generator seeded with the hash
        let mut state = hash;
        let mut vector: Vec<f32> = (0..TEXT_DIMENSIONS)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) as f32 / (1u64 << 31) as f32) - 0.5
            })
            .collect();
        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl TextEmbedder for FakeTextEmbedder {
    fn model_id(&self) -> &str {
        TEXT_MODEL_ID
    }

    fn dimension(&self) -> usize {
        TEXT_DIMENSIONS
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

/// Image embedder whose un-normalized output depends on mean pixel color
pub struct FakeImageEmbedder;

#[async_trait]
impl ImageEmbedder for FakeImageEmbedder {
    fn model_id(&self) -> &str {
        IMAGE_MODEL_ID
    }

    fn dimension(&self) -> usize {
        IMAGE_DIMENSIONS
    }

    fn preprocess(&self, image: &DynamicImage) -> Array3<f32> {
        preprocess_clip(image)
    }

    async fn embed_batch(&self, pixels: Array4<f32>) -> Result<Array2<f32>> {
        let mut rows = Array2::zeros((pixels.len_of(Axis(0)), IMAGE_DIMENSIONS));
        for (image, mut row) in pixels.outer_iter().zip(rows.outer_iter_mut()) {
            let means: Vec<f32> = image
                .outer_iter()
                .map(|channel| channel.mean().unwrap_or(0.0))
                .collect();
            for (i, value) in row.iter_mut().enumerate() {
                *value = 10.0 * means[i % 3] + i as f32 * 0.001;
            }
        }
        Ok(rows)
    }
}

/// Text embedder that always fails
pub struct FailingTextEmbedder;

#[async_trait]
impl TextEmbedder for FailingTextEmbedder {
    fn model_id(&self) -> &str {
        TEXT_MODEL_ID
    }

    fn dimension(&self) -> usize {
        TEXT_DIMENSIONS
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(anyhow!("inference backend unavailable"))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow!("inference backend unavailable"))
    }
}

pub fn fetcher() -> ImageFetcher {
    ImageFetcher::new(Duration::from_secs(1)).unwrap()
}

/// Context backed by the fake providers
pub fn fake_context() -> Arc<EncoderContext> {
    Arc::new(EncoderContext::new(
        Arc::new(FakeTextEmbedder),
        Arc::new(FakeImageEmbedder),
        fetcher(),
        Device::Cpu,
    ))
}

/// Fake-provider context with a custom fetch timeout
pub fn fake_context_with_timeout(timeout: Duration) -> Arc<EncoderContext> {
    Arc::new(EncoderContext::new(
        Arc::new(FakeTextEmbedder),
        Arc::new(FakeImageEmbedder),
        ImageFetcher::new(timeout).unwrap(),
        Device::Cpu,
    ))
}

/// Context whose text provider always fails
pub fn failing_text_context() -> Arc<EncoderContext> {
    Arc::new(EncoderContext::new(
        Arc::new(FailingTextEmbedder),
        Arc::new(FakeImageEmbedder),
        fetcher(),
        Device::Cpu,
    ))
}

/// Size of the oversized bodies served by the image server (over the 32 MB limit)
pub const OVERSIZED_BODY_BYTES: usize = 40 * 1024 * 1024;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG signature followed by zero filler, `OVERSIZED_BODY_BYTES` in total
fn oversized_png_chunks() -> impl Iterator<Item = Vec<u8>> {
    const CHUNK: usize = 1024 * 1024;
    let mut first = PNG_MAGIC.to_vec();
    first.resize(CHUNK, 0);
    std::iter::once(first).chain(std::iter::repeat(vec![0u8; CHUNK]).take(OVERSIZED_BODY_BYTES / CHUNK - 1))
}

pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn png_response(bytes: Vec<u8>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], bytes)
}

/// Local server with test images; returns its base URL
///
/// Routes:
/// - `/red.png`, `/blue.png`, `/wide.png`: valid images
/// - `/missing.png`: 404
/// - `/garbage.png`: 200 with bytes that are not an image
/// - `/slow.png`: answers after 3 seconds
/// - `/huge-chunked.png`: over 32 MB, streamed without Content-Length
/// - `/huge-sized.png`: over 32 MB, with Content-Length
pub async fn spawn_image_server() -> String {
    let app = Router::new()
        .route("/red.png", get(|| async { png_response(png_bytes(64, 48, [255, 0, 0])) }))
        .route("/blue.png", get(|| async { png_response(png_bytes(32, 32, [0, 0, 255])) }))
        .route("/wide.png", get(|| async { png_response(png_bytes(640, 120, [0, 200, 0])) }))
        .route("/missing.png", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/garbage.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], "definitely not a png") }),
        )
        .route(
            "/slow.png",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                png_response(png_bytes(8, 8, [1, 2, 3]))
            }),
        )
        .route(
            "/huge-chunked.png",
            get(|| async {
                let stream =
                    futures_util::stream::iter(oversized_png_chunks().map(Ok::<_, std::io::Error>));
                ([(header::CONTENT_TYPE, "image/png")], Body::from_stream(stream))
            }),
        )
        .route(
            "/huge-sized.png",
            get(|| async { png_response(oversized_png_chunks().flatten().collect()) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}
