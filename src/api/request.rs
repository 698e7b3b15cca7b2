// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Typed request bodies of the HTTP routes
//!
//! Unlike the single-call input object, each route accepts exactly one
//! shape. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

use super::ApiError;

/// Body of POST /encode/text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Body of POST /encode/image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub image_url: String,
}

/// Body of POST /encode/batch/text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTextRequest {
    pub texts: Vec<String>,
}

impl BatchTextRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.texts.is_empty() {
            return Err(ApiError::InvalidRequest(
                "texts list cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Body of POST /encode/batch/image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchImageRequest {
    pub image_urls: Vec<String>,
}

impl BatchImageRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.image_urls.is_empty() {
            return Err(ApiError::InvalidRequest(
                "image_urls list cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
