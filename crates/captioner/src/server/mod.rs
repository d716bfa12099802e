//! HTTP surface: `POST /generate-caption` and `GET /health`.

mod error;
mod handlers;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use captioner_core::{Captioner, Config};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Multipart framing allowance on top of the upload limit, so oversize
/// files are reported by the upload validator rather than cut off mid-body.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    captioner: Captioner,
    vocabulary_hash: Arc<str>,
}

/// Build the application router.
pub fn router(captioner: Captioner, config: &Config) -> Router {
    let body_limit = captioner.max_upload_bytes() as usize + MULTIPART_OVERHEAD_BYTES;
    let state = AppState {
        vocabulary_hash: captioner.vocabulary().content_hash().into(),
        captioner,
    };

    let mut app = Router::new()
        .route("/generate-caption", post(handlers::generate_caption))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    if config.server.cors_allow_any {
        let cors = CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
pub async fn run(captioner: Captioner, config: &Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(captioner, config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl-C received, shutting down..."),
        _ = terminate => tracing::info!("Terminate signal received, shutting down..."),
    }
}
