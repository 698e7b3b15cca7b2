// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model pre-fetch
//!
//! Downloads the ONNX weights and tokenizer from the HuggingFace Hub into the
//! configured model paths so the service never downloads at request time.

pub mod downloading;

pub use downloading::{
    image_model_source, text_model_source, verify_model_files, DownloadError, ModelDownloader,
    ModelFile, ModelSource, DEFAULT_IMAGE_REPO, DEFAULT_TEXT_REPO,
};
