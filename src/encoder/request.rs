// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request parsing for the untyped (single-call) input object
//!
//! Accepted shapes, checked in this order (first key found wins):
//! ```json
//! {"text": "red leather shoes"}
//! {"image_url": "https://example.com/shoe.jpg"}
//! {"texts": ["a", "b"]}
//! {"image_urls": ["https://...", "https://..."]}
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use super::response::{usage_examples, ErrorResult};

/// Recognized request keys in dispatch priority order
pub const EXPECTED_KEYS: [&str; 4] = ["text", "image_url", "texts", "image_urls"];

/// A validated encode request
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeRequest {
    Text(String),
    ImageUrl(String),
    /// Never empty
    Texts(Vec<String>),
    /// Never empty
    ImageUrls(Vec<String>),
}

/// Why an input object could not be turned into an [`EncodeRequest`]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    #[error("No input provided")]
    NoInput,

    #[error("Invalid input format")]
    InvalidFormat { received_keys: Vec<String> },

    #[error("{0}")]
    Validation(String),
}

impl From<RequestError> for ErrorResult {
    fn from(err: RequestError) -> Self {
        let error = err.to_string();
        match err {
            RequestError::NoInput => ErrorResult {
                error,
                usage: Some(usage_examples()),
                ..ErrorResult::default()
            },
            RequestError::InvalidFormat { received_keys } => ErrorResult {
                error,
                received_keys: Some(received_keys),
                expected_keys: Some(EXPECTED_KEYS.iter().map(|k| k.to_string()).collect()),
                ..ErrorResult::default()
            },
            RequestError::Validation(_) => ErrorResult::message(error),
        }
    }
}

impl EncodeRequest {
    /// Parse the `input` member of an event
    ///
    /// An absent, `null`, non-object or empty-object input is `NoInput`. If
    /// several recognized keys are present the earliest in [`EXPECTED_KEYS`]
    /// is used and the rest are ignored.
    pub fn parse(input: Option<&Value>) -> Result<Self, RequestError> {
        let object = match input {
            Some(Value::Object(map)) if !map.is_empty() => map,
            _ => return Err(RequestError::NoInput),
        };

        if let Some(value) = object.get("text") {
            return string_field(value, "text").map(Self::Text);
        }
        if let Some(value) = object.get("image_url") {
            return string_field(value, "image_url").map(Self::ImageUrl);
        }
        if let Some(value) = object.get("texts") {
            return string_list_field(value, "texts").map(Self::Texts);
        }
        if let Some(value) = object.get("image_urls") {
            return string_list_field(value, "image_urls").map(Self::ImageUrls);
        }

        Err(RequestError::InvalidFormat {
            received_keys: received_keys(object),
        })
    }

    /// Number of items the request encodes
    pub fn len(&self) -> usize {
        match self {
            Self::Text(_) | Self::ImageUrl(_) => 1,
            Self::Texts(items) | Self::ImageUrls(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn string_field(value: &Value, name: &str) -> Result<String, RequestError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RequestError::Validation(format!("{} must be a string", name)))
}

fn string_list_field(value: &Value, name: &str) -> Result<Vec<String>, RequestError> {
    let items = value
        .as_array()
        .ok_or_else(|| RequestError::Validation(format!("{} must be a list", name)))?;

    if items.is_empty() {
        return Err(RequestError::Validation(format!(
            "{} list cannot be empty",
            name
        )));
    }

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                RequestError::Validation(format!("{} must be a list of strings", name))
            })
        })
        .collect()
}

fn received_keys(object: &Map<String, Value>) -> Vec<String> {
    object.keys().cloned().collect()
}
