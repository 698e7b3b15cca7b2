// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the vector encoder

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-text-and-image-encoding-2025-11-02";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Identifier reported for text embeddings
pub const TEXT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Identifier reported for image embeddings
pub const IMAGE_MODEL_ID: &str = "openclip/ViT-B-32";

/// Output width of the text model
pub const TEXT_DIMENSIONS: usize = 384;

/// Output width of the image model
pub const IMAGE_DIMENSIONS: usize = 512;

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Vector Encoder {} ({})", VERSION_NUMBER, BUILD_DATE)
}
