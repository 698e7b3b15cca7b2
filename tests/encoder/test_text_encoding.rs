// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text encoding through the shared encode operations

use crate::common::{failing_text_context, fake_context, norm, FakeTextEmbedder};
use vector_encoder::encoder::{encode_batch_text, encode_text, EmbeddingKind, EncodeError};

#[tokio::test]
async fn test_single_text_envelope() {
    let ctx = fake_context();

    let result = encode_text(&ctx, "red leather shoes").await.unwrap();

    assert_eq!(result.dimensions, 384);
    assert_eq!(result.vector.len(), result.dimensions);
    assert_eq!(result.model, "sentence-transformers/all-MiniLM-L6-v2");
    assert_eq!(result.kind, EmbeddingKind::Text);
    assert!(result.latency_ms >= 0.0);
    assert!((norm(&result.vector) - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_single_text_is_deterministic() {
    let ctx = fake_context();

    let a = encode_text(&ctx, "blue cotton jacket").await.unwrap();
    let b = encode_text(&ctx, "blue cotton jacket").await.unwrap();
    assert_eq!(a.vector, b.vector);
}

#[tokio::test]
async fn test_empty_string_is_encoded() {
    let ctx = fake_context();
    let result = encode_text(&ctx, "").await.unwrap();
    assert_eq!(result.dimensions, 384);
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let ctx = fake_context();
    let texts: Vec<String> = ["red leather shoes", "blue cotton jacket", "black leather bag"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let result = encode_batch_text(&ctx, &texts).await.unwrap();

    assert_eq!(result.count, 3);
    assert_eq!(result.vectors.len(), result.count);
    assert_eq!(result.dimensions, 384);
    assert_eq!(result.kind, EmbeddingKind::Text);
    for (vector, text) in result.vectors.iter().zip(&texts) {
        assert_eq!(vector.len(), 384);
        assert_eq!(vector, &FakeTextEmbedder::vector_for(text));
    }
}

#[tokio::test]
async fn test_batch_average_latency_is_consistent() {
    let ctx = fake_context();
    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()];

    let result = encode_batch_text(&ctx, &texts).await.unwrap();

    // Average is derived from the unrounded latency, so allow rounding slack
    let expected = result.latency_ms / result.count as f64;
    assert!((result.avg_latency_per_item_ms - expected).abs() <= 0.01);
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let ctx = fake_context();

    let err = encode_batch_text(&ctx, &[]).await.unwrap_err();
    assert!(matches!(err, EncodeError::Validation(_)));
    assert_eq!(err.to_string(), "texts list cannot be empty");
}

#[tokio::test]
async fn test_provider_failure_is_processing_error() {
    let ctx = failing_text_context();

    let err = encode_text(&ctx, "anything").await.unwrap_err();
    assert!(matches!(err, EncodeError::Inference(_)));
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.error_type(), Some("InferenceError"));
    assert!(err.to_string().contains("inference backend unavailable"));
}
