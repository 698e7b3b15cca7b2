// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model file placement without network access

use std::path::PathBuf;
use tempfile::TempDir;
use vector_encoder::models::{
    image_model_source, text_model_source, verify_model_files, DownloadError, ModelDownloader,
    DEFAULT_IMAGE_REPO, DEFAULT_TEXT_REPO,
};
use vector_encoder::EncoderConfig;

fn config_in(dir: &TempDir) -> EncoderConfig {
    let models_dir = dir.path().to_string_lossy().to_string();
    EncoderConfig::from_lookup(|key| match key {
        "MODELS_DIR" => Some(models_dir.clone()),
        _ => None,
    })
    .unwrap()
}

fn touch(path: &PathBuf, contents: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_sources_point_into_models_dir() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let text = text_model_source(&config, DEFAULT_TEXT_REPO);
    let image = image_model_source(&config, DEFAULT_IMAGE_REPO);

    assert_eq!(text.files.len(), 2);
    assert_eq!(image.files.len(), 1);
    for file in text.files.iter().chain(&image.files) {
        assert!(file.local.starts_with(dir.path()));
    }
}

#[tokio::test]
async fn test_present_files_are_not_fetched_again() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let source = text_model_source(&config, "nonexistent-org/nonexistent-repo");
    for file in &source.files {
        touch(&file.local, b"weights");
    }

    let downloader =
        ModelDownloader::new(Some(dir.path().join("hub-cache")), None, false).unwrap();
    let paths = downloader.download(&source).await.unwrap();

    assert_eq!(paths, vec![config.text_model_path, config.text_tokenizer_path]);
}

#[test]
fn test_verify_reports_missing_and_empty() {
    let dir = TempDir::new().unwrap();
    let present = dir.path().join("model.onnx");
    let empty = dir.path().join("tokenizer.json");
    let missing = dir.path().join("vision_model.onnx");
    touch(&present, b"weights");
    touch(&empty, b"");

    assert!(verify_model_files(&[present.clone()]).is_ok());
    assert!(matches!(
        verify_model_files(&[present.clone(), empty]),
        Err(DownloadError::Empty(_))
    ));
    assert!(matches!(
        verify_model_files(&[present, missing]),
        Err(DownloadError::Missing(_))
    ));
}
