// src/server/mod.rs
// =============================================================================
// The HTTP API.
//
// Endpoints:
//   GET  /healthz              liveness check
//   GET  /api/github-dir       validate token, walk a directory, list files
//   POST /api/github-content   download file contents for a batch of files
//   POST /api/github-export    zip a list of files
//   POST /api/image-tool       resize an uploaded image into JPEG renditions
//
// BEGINNER NOTES:
// - AppState is cloned into every handler. It only holds the config and a
//   reqwest::Client, and cloning a Client just bumps a reference count
// - Handlers return Result<_, AppError>; AppError knows how to turn itself
//   into an HTTP response (see error.rs), so `?` works inside handlers
// =============================================================================

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;

/// Header carrying the caller's GitHub token
pub const TOKEN_HEADER: &str = "api-token-x";

/// Header carrying the image tool's shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = config.http_client()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/api/github-dir", get(routes::github_dir))
        .route("/api/github-content", post(routes::github_content))
        .route("/api/github-export", post(routes::github_export))
        .route("/api/image-tool", post(routes::image_tool))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: AppConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let state = AppState::new(config)?;
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl-C");
        // Without a signal handler, never resolve and keep serving
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
