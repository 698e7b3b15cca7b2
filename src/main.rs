// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use vector_encoder::{api, logging, version, EncoderConfig, EncoderContext};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_tracing();

    info!("{}", "=".repeat(70));
    info!("INITIALIZING VECTOR ENCODING SERVICE");
    info!("{}", version::get_version_string());
    info!("{}", "=".repeat(70));

    let config = match EncoderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let addr = match config.listen_addr().await {
        Ok(addr) => addr,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let ctx = match EncoderContext::load(&config).await {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!("❌ Model loading failed: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Device: {}", ctx.device());
    info!("SERVICE READY");

    api::start_server(ctx, addr).await
}
