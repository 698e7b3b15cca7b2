// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Route handlers
//!
//! Each handler validates its own body shape and then calls the shared
//! encode operation.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{debug, warn};

use super::http_server::AppState;
use super::request::{BatchImageRequest, BatchTextRequest, ImageRequest, TextRequest};
use super::ApiError;
use crate::encoder::{
    encode_batch_images, encode_batch_text, encode_image, encode_text, BatchEncodeResult,
    EncodeError, EncodeResult, HealthStatus,
};

/// GET /
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.encoder.health())
}

/// POST /encode/text
pub async fn encode_text_handler(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<EncodeResult>, ApiError> {
    let Json(request) = payload?;
    debug!("POST /encode/text ({} chars)", request.text.len());

    encode_text(&state.encoder, &request.text)
        .await
        .map(Json)
        .map_err(log_failure)
}

/// POST /encode/image
pub async fn encode_image_handler(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<EncodeResult>, ApiError> {
    let Json(request) = payload?;
    debug!("POST /encode/image {}", request.image_url);

    encode_image(&state.encoder, &request.image_url)
        .await
        .map(Json)
        .map_err(log_failure)
}

/// POST /encode/batch/text
pub async fn encode_batch_text_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchTextRequest>, JsonRejection>,
) -> Result<Json<BatchEncodeResult>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    debug!("POST /encode/batch/text ({} texts)", request.texts.len());

    encode_batch_text(&state.encoder, &request.texts)
        .await
        .map(Json)
        .map_err(log_failure)
}

/// POST /encode/batch/image
pub async fn encode_batch_image_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchImageRequest>, JsonRejection>,
) -> Result<Json<BatchEncodeResult>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    debug!("POST /encode/batch/image ({} urls)", request.image_urls.len());

    encode_batch_images(&state.encoder, &request.image_urls)
        .await
        .map(Json)
        .map_err(log_failure)
}

fn log_failure(err: EncodeError) -> ApiError {
    warn!("Encode request failed: {}", err);
    ApiError::from(err)
}
