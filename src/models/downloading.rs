// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use hf_hub::api::tokio::{Api, ApiBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::EncoderConfig;

/// HuggingFace repository of the ONNX sentence transformer
pub const DEFAULT_TEXT_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// HuggingFace repository of the ONNX export of OpenCLIP ViT-B-32 (laion2b_s34b_b79k)
pub const DEFAULT_IMAGE_REPO: &str = "Xenova/CLIP-ViT-B-32-laion2B-s34B-b79K";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Hub error for {repo}/{file}: {message}")]
    Hub {
        repo: String,
        file: String,
        message: String,
    },
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Model file missing after download: {0}")]
    Missing(PathBuf),
    #[error("Model file is empty: {0}")]
    Empty(PathBuf),
}

/// One file of a repository and where it must end up locally
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFile {
    /// Path inside the repository
    pub remote: String,
    /// Destination on disk
    pub local: PathBuf,
}

/// A repository and the files needed from it
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSource {
    pub repo: String,
    pub files: Vec<ModelFile>,
}

/// Files of the sentence transformer placed at the configured paths
pub fn text_model_source(config: &EncoderConfig, repo: &str) -> ModelSource {
    ModelSource {
        repo: repo.to_string(),
        files: vec![
            ModelFile {
                remote: "onnx/model.onnx".to_string(),
                local: config.text_model_path.clone(),
            },
            ModelFile {
                remote: "tokenizer.json".to_string(),
                local: config.text_tokenizer_path.clone(),
            },
        ],
    }
}

/// Vision tower of the CLIP model placed at the configured path
pub fn image_model_source(config: &EncoderConfig, repo: &str) -> ModelSource {
    ModelSource {
        repo: repo.to_string(),
        files: vec![ModelFile {
            remote: "onnx/vision_model.onnx".to_string(),
            local: config.image_model_path.clone(),
        }],
    }
}

/// Fetches model files through the HuggingFace Hub cache
pub struct ModelDownloader {
    api: Api,
    force: bool,
}

impl ModelDownloader {
    /// `cache_dir` overrides the default hub cache; `token` is needed for
    /// gated repositories only.
    pub fn new(
        cache_dir: Option<PathBuf>,
        token: Option<String>,
        force: bool,
    ) -> Result<Self, DownloadError> {
        let mut builder = ApiBuilder::new().with_progress(false).with_token(token);
        if let Some(dir) = cache_dir {
            builder = builder.with_cache_dir(dir);
        }
        let api = builder.build().map_err(|e| DownloadError::Hub {
            repo: String::new(),
            file: String::new(),
            message: e.to_string(),
        })?;

        Ok(Self { api, force })
    }

    /// Download every file of `source`, skipping files already present
    ///
    /// Returns the local paths in the order of `source.files`.
    pub async fn download(&self, source: &ModelSource) -> Result<Vec<PathBuf>, DownloadError> {
        info!("Downloading {} file(s) from {}", source.files.len(), source.repo);

        let progress = ProgressBar::new(source.files.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        progress.enable_steady_tick(Duration::from_millis(120));

        let repo = self.api.model(source.repo.clone());
        let mut paths = Vec::with_capacity(source.files.len());

        for file in &source.files {
            progress.set_message(file.remote.clone());

            if !self.force && is_present(&file.local).await {
                debug!("Already present: {}", file.local.display());
                paths.push(file.local.clone());
                progress.inc(1);
                continue;
            }

            let cached = repo.get(&file.remote).await.map_err(|e| DownloadError::Hub {
                repo: source.repo.clone(),
                file: file.remote.clone(),
                message: e.to_string(),
            })?;

            place_file(&cached, &file.local).await?;
            info!("✓ {} -> {}", file.remote, file.local.display());
            paths.push(file.local.clone());
            progress.inc(1);
        }

        progress.finish_with_message(format!("{} ready", source.repo));
        verify_model_files(&paths)?;
        Ok(paths)
    }
}

/// Check that every path exists and is a non-empty file
pub fn verify_model_files(paths: &[PathBuf]) -> Result<(), DownloadError> {
    for path in paths {
        let metadata = std::fs::metadata(path).map_err(|_| DownloadError::Missing(path.clone()))?;
        if !metadata.is_file() {
            return Err(DownloadError::Missing(path.clone()));
        }
        if metadata.len() == 0 {
            return Err(DownloadError::Empty(path.clone()));
        }
    }
    Ok(())
}

async fn is_present(path: &Path) -> bool {
    matches!(tokio::fs::metadata(path).await, Ok(m) if m.is_file() && m.len() > 0)
}

/// Copy a file out of the hub cache to its configured destination
async fn place_file(cached: &Path, destination: &Path) -> Result<(), DownloadError> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| DownloadError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::copy(cached, destination)
        .await
        .map_err(|source| DownloadError::Io {
            path: destination.to_path_buf(),
            source,
        })?;
    Ok(())
}
