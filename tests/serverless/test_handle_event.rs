// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! One event in, one JSON reply out

use crate::common::{failing_text_context, fake_context, spawn_image_server};
use serde_json::json;
use std::io::Write;
use vector_encoder::serverless::{handle_event, run_once, EventSource};

#[tokio::test]
async fn test_text_event() {
    let ctx = fake_context();

    let reply = handle_event(&ctx, &json!({"input": {"text": "red leather shoes"}})).await;

    assert_eq!(reply["dimensions"], 384);
    assert_eq!(reply["type"], "text");
    assert_eq!(reply["vector"].as_array().unwrap().len(), 384);
    assert!(reply.get("error").is_none());
}

#[tokio::test]
async fn test_batch_image_event() {
    let base = spawn_image_server().await;
    let ctx = fake_context();

    let reply = handle_event(
        &ctx,
        &json!({"input": {"image_urls": [format!("{}/red.png", base), format!("{}/blue.png", base)]}}),
    )
    .await;

    assert_eq!(reply["count"], 2);
    assert_eq!(reply["dimensions"], 512);
    assert_eq!(reply["type"], "image");
}

#[tokio::test]
async fn test_missing_input_returns_usage() {
    let ctx = fake_context();

    for event in [json!({}), json!({"input": {}}), json!({"input": null}), json!("text")] {
        let reply = handle_event(&ctx, &event).await;
        assert_eq!(reply["error"], "No input provided");
        assert!(reply["usage"].is_object());
        assert!(reply.get("error_type").is_none());
    }
}

#[tokio::test]
async fn test_unknown_keys_reply() {
    let ctx = fake_context();

    let reply = handle_event(&ctx, &json!({"input": {"prompt": "x"}})).await;

    assert_eq!(reply["error"], "Invalid input format");
    assert_eq!(reply["received_keys"], json!(["prompt"]));
    assert_eq!(
        reply["expected_keys"],
        json!(["text", "image_url", "texts", "image_urls"])
    );
}

#[tokio::test]
async fn test_download_failure_reply() {
    let base = spawn_image_server().await;
    let ctx = fake_context();

    let reply = handle_event(
        &ctx,
        &json!({"input": {"image_url": format!("{}/missing.png", base)}}),
    )
    .await;

    let error = reply["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to download image: "));
}

#[tokio::test]
async fn test_processing_failure_reply() {
    let base = spawn_image_server().await;
    let ctx = fake_context();

    let reply = handle_event(
        &ctx,
        &json!({"input": {"image_url": format!("{}/garbage.png", base)}}),
    )
    .await;

    assert!(reply["error"].as_str().unwrap().starts_with("Processing failed: "));
    assert_eq!(reply["error_type"], "ImageDecodeError");

    let ctx = failing_text_context();
    let reply = handle_event(&ctx, &json!({"input": {"texts": ["a"]}})).await;
    assert_eq!(reply["error_type"], "InferenceError");
}

#[tokio::test]
async fn test_run_once_inline() {
    let ctx = fake_context();

    let reply = run_once(
        &ctx,
        &EventSource::Inline(r#"{"input": {"texts": ["a", "b", "c"]}}"#.to_string()),
    )
    .await
    .unwrap();

    assert_eq!(reply["count"], 3);
}

#[tokio::test]
async fn test_run_once_file() {
    let ctx = fake_context();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"input": {{"text": "from a file"}}}}"#).unwrap();

    let reply = run_once(&ctx, &EventSource::File(file.path().to_path_buf()))
        .await
        .unwrap();

    assert_eq!(reply["dimensions"], 384);
}

#[tokio::test]
async fn test_run_once_rejects_invalid_json() {
    let ctx = fake_context();

    let result = run_once(&ctx, &EventSource::Inline("not json".to_string())).await;
    assert!(result.is_err());
}
