// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Dispatch of untyped input objects to the encode operations

use serde_json::Value;
use tracing::{debug, warn};

use super::context::EncoderContext;
use super::errors::EncodeError;
use super::request::EncodeRequest;
use super::response::{EncodeResponse, ErrorResult};
use super::service;

/// Parse `input`, run the matching operation and return its envelope
///
/// Every failure comes back as an [`ErrorResult`]; nothing escapes.
pub async fn route(
    ctx: &EncoderContext,
    input: Option<&Value>,
) -> Result<EncodeResponse, ErrorResult> {
    let request = EncodeRequest::parse(input).map_err(|e| {
        debug!("Rejected input: {}", e);
        ErrorResult::from(e)
    })?;

    dispatch(ctx, &request).await.map_err(|e| {
        warn!("Encode request failed: {}", e);
        e.to_error_result()
    })
}

/// Run the operation for an already parsed request
pub async fn dispatch(
    ctx: &EncoderContext,
    request: &EncodeRequest,
) -> Result<EncodeResponse, EncodeError> {
    debug!("Dispatching request with {} item(s)", request.len());
    match request {
        EncodeRequest::Text(text) => service::encode_text(ctx, text)
            .await
            .map(EncodeResponse::Single),
        EncodeRequest::ImageUrl(url) => service::encode_image(ctx, url)
            .await
            .map(EncodeResponse::Single),
        EncodeRequest::Texts(texts) => service::encode_batch_text(ctx, texts)
            .await
            .map(EncodeResponse::Batch),
        EncodeRequest::ImageUrls(urls) => service::encode_batch_images(ctx, urls)
            .await
            .map(EncodeResponse::Batch),
    }
}
