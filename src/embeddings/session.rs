// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Runtime session construction shared by the text and image models
//!
//! CUDA is attempted first when requested. If the CUDA execution provider
//! cannot be registered the session is rebuilt on the CPU provider.

use anyhow::{Context, Result};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProviderDispatch,
};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use tracing::{info, warn};

use super::Device;

/// Builds a session for `model_path`, reporting where it was placed
pub fn build_session(
    model_path: &Path,
    use_gpu: bool,
    intra_threads: usize,
) -> Result<(Session, Device)> {
    if !model_path.exists() {
        anyhow::bail!("ONNX model file not found: {}", model_path.display());
    }

    if use_gpu {
        info!("Attempting CUDA execution provider for {}", model_path.display());
        let cuda = CUDAExecutionProvider::default().build().error_on_failure();
        match commit(model_path, cuda, intra_threads) {
            Ok(session) => {
                info!("✅ CUDA execution provider initialized");
                return Ok((session, Device::Cuda));
            }
            Err(e) => {
                warn!("⚠️  CUDA execution provider failed: {:#}", e);
                warn!("   Falling back to CPU execution provider");
            }
        }
    }

    let session = commit(
        model_path,
        CPUExecutionProvider::default().build(),
        intra_threads,
    )?;
    Ok((session, Device::Cpu))
}

fn commit(
    model_path: &Path,
    provider: ExecutionProviderDispatch,
    intra_threads: usize,
) -> Result<Session> {
    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([provider])
        .context("Failed to set execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;
    Ok(session)
}
