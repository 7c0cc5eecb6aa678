use std::net::SocketAddr;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::{
    services::{
        demo_registry, download, empty, get_article, greeting, health, moved, opaque, raw_bytes,
        stats,
    },
    state::AppState,
};
use crate::config::Config;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Demo routes, one per kind of handler result.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/greeting", get(greeting))
        .route("/bytes", get(raw_bytes))
        .route("/empty", get(empty))
        .route("/stats", get(stats))
        .route("/articles/{id}", get(get_article))
        .route("/download", get(download))
        .route("/moved", get(moved))
        .route("/opaque", get(opaque))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(address: Option<SocketAddr>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
    let address = address.unwrap_or(config.server.bind_addr);

    let registry = demo_registry(&config.negotiation)
        .map_err(|e| format!("Failed to build converter registry: {}", e))?;
    info!(converters = registry.len(), "Converter registry ready");

    let app = router(AppState::new(config, registry));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "mediacork demo server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
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
