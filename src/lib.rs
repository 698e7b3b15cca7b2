// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod encoder;
pub mod imaging;
pub mod logging;
pub mod models;
pub mod serverless;
pub mod version;

pub use config::{ConfigError, EncoderConfig};
pub use embeddings::{Device, ImageEmbedder, TextEmbedder};
pub use encoder::{
    BatchEncodeResult, EncodeError, EncodeRequest, EncodeResponse, EncodeResult, EncoderContext,
    ErrorResult,
};
