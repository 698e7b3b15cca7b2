// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Failure taxonomy for encode operations

use thiserror::Error;

use super::response::ErrorResult;
use crate::imaging::{FetchError, ImageError};

/// Why an encode operation failed
///
/// `Validation` and `Fetch` are the caller's fault (HTTP 400). `Decode` and
/// `Inference` are processing errors (HTTP 500). None of them stop the
/// process.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to download image: {0}")]
    Fetch(#[from] FetchError),

    #[error("Processing failed: {0}")]
    Decode(#[from] ImageError),

    #[error("Processing failed: {0:#}")]
    Inference(anyhow::Error),
}

impl EncodeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classification reported alongside processing errors
    pub fn error_type(&self) -> Option<&'static str> {
        match self {
            Self::Validation(_) | Self::Fetch(_) => None,
            Self::Decode(_) => Some("ImageDecodeError"),
            Self::Inference(_) => Some("InferenceError"),
        }
    }

    /// True when the request itself was at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Fetch(_))
    }

    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    pub fn to_error_result(&self) -> ErrorResult {
        ErrorResult {
            error: self.to_string(),
            error_type: self.error_type().map(str::to_string),
            ..ErrorResult::default()
        }
    }
}
