// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{
    encode_batch_image_handler, encode_batch_text_handler, encode_image_handler,
    encode_text_handler, health_handler,
};
use crate::encoder::EncoderContext;

#[derive(Clone)]
pub struct AppState {
    pub encoder: Arc<EncoderContext>,
}

impl AppState {
    pub fn new(encoder: Arc<EncoderContext>) -> Self {
        Self { encoder }
    }
}

/// Build the router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health_handler))
        // Single items
        .route("/encode/text", post(encode_text_handler))
        .route("/encode/image", post(encode_image_handler))
        // Batches
        .route("/encode/batch/text", post(encode_batch_text_handler))
        .route("/encode/batch/image", post(encode_batch_image_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM
pub async fn start_server(encoder: Arc<EncoderContext>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve(listener, encoder, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, encoder: Arc<EncoderContext>, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_app(AppState::new(encoder));

    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("API server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
