// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encoding core shared by every transport
//!
//! - [`EncoderContext`]: the loaded providers plus the image fetcher, built
//!   once at startup
//! - [`EncodeRequest`]: the four accepted request shapes
//! - [`service`]: text, image, batch text and batch image encoding
//! - [`route`]: parses a raw JSON input and dispatches it
//!
//! The HTTP service and the single-call handler both sit on top of this
//! module and never duplicate its logic.

pub mod context;
pub mod errors;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use context::EncoderContext;
pub use errors::EncodeError;
pub use request::{EncodeRequest, RequestError, EXPECTED_KEYS};
pub use response::{
    BatchEncodeResult, EmbeddingKind, EncodeResponse, EncodeResult, ErrorResult, HealthStatus,
    ModelNames,
};
pub use router::{dispatch, route};
pub use service::{encode_batch_images, encode_batch_text, encode_image, encode_text};
