// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration for the encoder service and CLI
//!
//! Every setting has a default and can be overridden from the environment
//! (optionally loaded from a `.env` file by the binaries).

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default directory holding downloaded model files
pub const DEFAULT_MODELS_DIR: &str = "./models";

/// Subdirectory of the models dir holding the sentence transformer
pub const TEXT_MODEL_SUBDIR: &str = "all-MiniLM-L6-v2-onnx";

/// Subdirectory of the models dir holding the CLIP vision tower
pub const IMAGE_MODEL_SUBDIR: &str = "clip-vit-b-32-onnx";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: String, value: String },

    #[error("{name} must be true/false/1/0, got '{value}'")]
    InvalidBool { name: String, value: String },

    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),
}

/// Configuration shared by the HTTP service, the single-call handler and the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    /// Root directory for model files (default: ./models)
    pub models_dir: PathBuf,
    /// ONNX file of the sentence transformer
    pub text_model_path: PathBuf,
    /// tokenizer.json of the sentence transformer
    pub text_tokenizer_path: PathBuf,
    /// ONNX file of the CLIP vision tower
    pub image_model_path: PathBuf,
    /// Host the HTTP service binds to, IP or hostname (default: 0.0.0.0)
    pub api_host: String,
    /// Port the HTTP service binds to (default: 8000)
    pub api_port: u16,
    /// Per-image download timeout in seconds (default: 10)
    pub fetch_timeout_secs: u64,
    /// Try the CUDA execution provider before CPU (default: true)
    pub use_gpu: bool,
    /// Intra-op threads per ONNX session (default: 4)
    pub intra_threads: usize,
}

impl EncoderConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Model paths default to locations under `MODELS_DIR` unless set
    /// explicitly.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let models_dir = lookup("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.models_dir);
        let text_dir = models_dir.join(TEXT_MODEL_SUBDIR);
        let image_dir = models_dir.join(IMAGE_MODEL_SUBDIR);

        let config = Self {
            text_model_path: lookup("TEXT_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| text_dir.join("model.onnx")),
            text_tokenizer_path: lookup("TEXT_TOKENIZER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| text_dir.join("tokenizer.json")),
            image_model_path: lookup("IMAGE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| image_dir.join("vision_model.onnx")),
            models_dir,
            api_host: lookup("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_number(&lookup, "API_PORT", defaults.api_port)?,
            fetch_timeout_secs: parse_number(
                &lookup,
                "IMAGE_FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout_secs,
            )?,
            use_gpu: parse_bool(&lookup, "ENCODER_USE_GPU", defaults.use_gpu)?,
            intra_threads: parse_number(&lookup, "ONNX_INTRA_THREADS", defaults.intra_threads)?,
        };

        Ok(config)
    }

    /// Socket address the HTTP service listens on
    ///
    /// `api_host` may be an IP literal or a hostname; hostnames are resolved
    /// and the first address is used.
    pub async fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || ConfigError::InvalidAddress(format!("{}:{}", self.api_host, self.api_port));
        tokio::net::lookup_host((self.api_host.as_str(), self.api_port))
            .await
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Directory the text model files are downloaded into
    pub fn text_model_dir(&self) -> PathBuf {
        self.models_dir.join(TEXT_MODEL_SUBDIR)
    }

    /// Directory the image model files are downloaded into
    pub fn image_model_dir(&self) -> PathBuf {
        self.models_dir.join(IMAGE_MODEL_SUBDIR)
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        let models_dir = PathBuf::from(DEFAULT_MODELS_DIR);
        let text_dir = models_dir.join(TEXT_MODEL_SUBDIR);
        let image_dir = models_dir.join(IMAGE_MODEL_SUBDIR);
        Self {
            text_model_path: text_dir.join("model.onnx"),
            text_tokenizer_path: text_dir.join("tokenizer.json"),
            image_model_path: image_dir.join("vision_model.onnx"),
            models_dir,
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            fetch_timeout_secs: 10,
            use_gpu: true,
            intra_threads: 4,
        }
    }
}

fn parse_number<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value > T::default() => Ok(value),
            _ => Err(ConfigError::InvalidNumber {
                name: name.to_string(),
                value: raw,
            }),
        },
    }
}

fn parse_bool<F>(lookup: &F, name: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                name: name.to_string(),
                value: raw,
            }),
        },
    }
}
