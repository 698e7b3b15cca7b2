// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Routing of untyped input objects

use crate::common::{failing_text_context, fake_context, spawn_image_server};
use serde_json::{json, Value};
use vector_encoder::encoder::{route, EncodeResponse};

fn single(response: EncodeResponse) -> vector_encoder::EncodeResult {
    match response {
        EncodeResponse::Single(result) => result,
        other => panic!("expected single result, got {:?}", other),
    }
}

fn batch(response: EncodeResponse) -> vector_encoder::BatchEncodeResult {
    match response {
        EncodeResponse::Batch(result) => result,
        other => panic!("expected batch result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_routes_each_shape() {
    let base = spawn_image_server().await;
    let ctx = fake_context();

    let text = single(route(&ctx, Some(&json!({"text": "hello"}))).await.unwrap());
    assert_eq!(text.dimensions, 384);

    let image = single(
        route(&ctx, Some(&json!({"image_url": format!("{}/red.png", base)})))
            .await
            .unwrap(),
    );
    assert_eq!(image.dimensions, 512);

    let texts = batch(
        route(&ctx, Some(&json!({"texts": ["a", "b"]})))
            .await
            .unwrap(),
    );
    assert_eq!(texts.count, 2);

    let images = batch(
        route(
            &ctx,
            Some(&json!({"image_urls": [format!("{}/blue.png", base)]})),
        )
        .await
        .unwrap(),
    );
    assert_eq!(images.count, 1);
    assert_eq!(images.dimensions, 512);
}

#[tokio::test]
async fn test_no_input_returns_usage() {
    let ctx = fake_context();

    for input in [None, Some(json!({})), Some(Value::Null)] {
        let err = route(&ctx, input.as_ref()).await.unwrap_err();
        assert_eq!(err.error, "No input provided");
        let usage = err.usage.expect("usage present");
        assert!(usage.get("single_text").is_some());
        assert!(usage.get("batch_images").is_some());
    }
}

#[tokio::test]
async fn test_unknown_keys_listed() {
    let ctx = fake_context();

    let err = route(&ctx, Some(&json!({"query": "x", "limit": 3})))
        .await
        .unwrap_err();

    assert_eq!(err.error, "Invalid input format");
    let mut received = err.received_keys.unwrap();
    received.sort();
    assert_eq!(received, vec!["limit".to_string(), "query".to_string()]);
    assert_eq!(err.expected_keys.unwrap().len(), 4);
}

#[tokio::test]
async fn test_validation_errors() {
    let ctx = fake_context();

    let err = route(&ctx, Some(&json!({"texts": "not a list"})))
        .await
        .unwrap_err();
    assert_eq!(err.error, "texts must be a list");

    let err = route(&ctx, Some(&json!({"image_urls": []})))
        .await
        .unwrap_err();
    assert_eq!(err.error, "image_urls list cannot be empty");
    assert!(err.error_type.is_none());
}

#[tokio::test]
async fn test_text_key_wins_over_others() {
    let ctx = fake_context();

    let result = route(&ctx, Some(&json!({"text": "t", "texts": ["a", "b", "c"]})))
        .await
        .unwrap();
    assert!(matches!(result, EncodeResponse::Single(_)));
}

#[tokio::test]
async fn test_download_failure_envelope() {
    let base = spawn_image_server().await;
    let ctx = fake_context();

    let err = route(
        &ctx,
        Some(&json!({"image_url": format!("{}/missing.png", base)})),
    )
    .await
    .unwrap_err();

    assert!(err.error.starts_with("Failed to download image: "));
    assert!(err.error_type.is_none());
}

#[tokio::test]
async fn test_processing_failure_envelope() {
    let ctx = failing_text_context();

    let err = route(&ctx, Some(&json!({"text": "x"}))).await.unwrap_err();

    assert!(err.error.starts_with("Processing failed: "));
    assert_eq!(err.error_type.as_deref(), Some("InferenceError"));
}

#[tokio::test]
async fn test_context_survives_failures() {
    let ctx = fake_context();

    let _ = route(&ctx, Some(&json!({"texts": []}))).await;
    let _ = route(&ctx, Some(&json!({"image_url": "http://127.0.0.1:9/x.png"}))).await;

    let ok = route(&ctx, Some(&json!({"text": "still serving"}))).await;
    assert!(ok.is_ok());
}
