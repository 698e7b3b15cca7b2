// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP image fetching with a per-request timeout

use anyhow::Context;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::decode::MAX_IMAGE_SIZE;

/// Image download error types
///
/// The `Display` text is the cause reported back to callers after
/// "Failed to download image: ".
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// URL did not parse or is not http(s)
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    /// Request timed out
    #[error("Timeout fetching: {0}")]
    Timeout(String),

    /// Connection or protocol failure
    #[error("HTTP error: {0}")]
    Request(String),

    /// HTTP non-success status
    #[error("HTTP {0} for: {1}")]
    Status(u16, String),

    /// Body could not be read or exceeded the size limit
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Downloads image bytes over HTTP(S)
///
/// One attempt per URL, no retries.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    timeout: Duration,
}

impl ImageFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vector-encoder/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the raw bytes behind `url`
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{} ({})", url, e)))?;
        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        debug!("Fetching image from: {}", url);

        let mut response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16(), url.to_string()));
        }

        if let Some(length) = response.content_length() {
            if length as usize > MAX_IMAGE_SIZE {
                return Err(FetchError::Body(format!(
                    "{} bytes exceeds limit of {} bytes",
                    length, MAX_IMAGE_SIZE
                )));
            }
        }

        // Content-Length may be absent (chunked), so the limit is also enforced while reading
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Body(e.to_string())
            }
        })? {
            if bytes.len() + chunk.len() > MAX_IMAGE_SIZE {
                return Err(FetchError::Body(format!(
                    "body exceeds limit of {} bytes",
                    MAX_IMAGE_SIZE
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from: {}", bytes.len(), url);
        Ok(bytes)
    }
}
