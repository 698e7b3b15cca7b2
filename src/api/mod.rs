// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP service adapter
//!
//! | Method | Path                  | Body             |
//! |--------|-----------------------|------------------|
//! | GET    | `/`                   |                  |
//! | POST   | `/encode/text`        | `{text}`         |
//! | POST   | `/encode/image`       | `{image_url}`    |
//! | POST   | `/encode/batch/text`  | `{texts}`        |
//! | POST   | `/encode/batch/image` | `{image_urls}`   |
//!
//! Errors are returned as `{"detail": "..."}` with status 400 (bad request
//! or image download failure) or 500 (processing failure).

pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod request;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{
    encode_batch_image_handler, encode_batch_text_handler, encode_image_handler,
    encode_text_handler, health_handler,
};
pub use http_server::{create_app, serve, shutdown_signal, start_server, AppState};
pub use request::{BatchImageRequest, BatchTextRequest, ImageRequest, TextRequest};
