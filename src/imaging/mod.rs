// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image retrieval and decoding
//!
//! Images arrive as URLs. The fetcher downloads the raw bytes and the decoder
//! turns them into three-channel RGB images ready for preprocessing.

pub mod decode;
pub mod fetcher;

pub use decode::{decode_image_bytes, detect_format, ImageError, MAX_IMAGE_SIZE};
pub use fetcher::{FetchError, ImageFetcher};
