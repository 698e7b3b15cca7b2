// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoder::EncodeError;

/// Error body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Malformed body or failed field validation
    InvalidRequest(String),
    /// An image URL could not be downloaded
    DownloadFailed(String),
    /// Decode or inference failure
    Processing(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::DownloadFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            detail: self.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg)
            | ApiError::DownloadFailed(msg)
            | ApiError::Processing(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<EncodeError> for ApiError {
    fn from(err: EncodeError) -> Self {
        let message = err.to_string();
        match err {
            EncodeError::Validation(_) => ApiError::InvalidRequest(message),
            EncodeError::Fetch(_) => ApiError::DownloadFailed(message),
            EncodeError::Decode(_) | EncodeError::Inference(_) => ApiError::Processing(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
