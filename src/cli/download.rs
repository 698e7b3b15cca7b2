// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::EncoderConfig;
use crate::encoder::EncoderContext;
use crate::models::{
    image_model_source, text_model_source, ModelDownloader, DEFAULT_IMAGE_REPO, DEFAULT_TEXT_REPO,
};

/// Arguments for the download command
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Root directory for model files
    #[arg(long, env = "MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Repository of the ONNX sentence transformer
    #[arg(long, env = "TEXT_MODEL_REPO", default_value = DEFAULT_TEXT_REPO)]
    pub text_repo: String,

    /// Repository of the ONNX CLIP vision tower
    #[arg(long, env = "IMAGE_MODEL_REPO", default_value = DEFAULT_IMAGE_REPO)]
    pub image_repo: String,

    /// HuggingFace hub cache directory
    #[arg(long, env = "HF_HOME")]
    pub cache_dir: Option<PathBuf>,

    /// HuggingFace access token (gated repositories only)
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Re-download files that already exist
    #[arg(long)]
    pub force: bool,

    /// Load both models after downloading to confirm they run
    #[arg(long)]
    pub verify: bool,
}

/// Download both models; any failure is returned so the binary exits non-zero
pub async fn download_models(args: DownloadArgs) -> Result<()> {
    let config = match &args.models_dir {
        Some(dir) => {
            let dir = dir.to_string_lossy().to_string();
            EncoderConfig::from_lookup(|key| {
                if key == "MODELS_DIR" {
                    Some(dir.clone())
                } else {
                    std::env::var(key).ok()
                }
            })?
        }
        None => EncoderConfig::from_env()?,
    };

    let downloader = ModelDownloader::new(args.cache_dir.clone(), args.hf_token.clone(), args.force)?;

    info!("[1/2] Sentence transformer ({})", args.text_repo);
    downloader
        .download(&text_model_source(&config, &args.text_repo))
        .await
        .context("Text model download failed")?;

    info!("[2/2] CLIP image encoder ({})", args.image_repo);
    downloader
        .download(&image_model_source(&config, &args.image_repo))
        .await
        .context("Image model download failed")?;

    if args.verify {
        info!("Verifying models load...");
        let ctx = EncoderContext::load(&config).await?;
        info!("✓ Models load on {}", ctx.device());
    }

    println!("✅ All models downloaded to {}", config.models_dir.display());
    Ok(())
}
