//! PDFToolz Server
//!
//! Merge, split, compress, convert to Word/Excel/PowerPoint and reorder
//! pages of uploaded PDFs. Results are served back from a download area.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdftoolz_server::artifacts::ArtifactStore;
use pdftoolz_server::config::Config;
use pdftoolz_server::routes;
use pdftoolz_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pdftoolz_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting PDFToolz Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Upload dir: {}", config.storage.upload_dir.display());
    tracing::info!("Download dir: {}", config.storage.download_dir.display());

    let store = ArtifactStore::new(&config.storage.upload_dir, &config.storage.download_dir);
    store
        .init()
        .await
        .context("Failed to create upload/download directories")?;

    if let Some(ttl) = config.retention.ttl() {
        spawn_sweeper(store.clone(), ttl, config.retention.sweep_interval());
    } else {
        tracing::info!("Artifact expiry disabled");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid SERVER_HOST/SERVER_PORT")?;

    let app = routes::app(AppState::new(config, store));

    tracing::info!("PDFToolz started at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Periodically purge expired artifacts and stale scratch files
fn spawn_sweeper(store: ArtifactStore, ttl: std::time::Duration, every: std::time::Duration) {
    tracing::info!("Artifact expiry: {}s, sweeping every {}s", ttl.as_secs(), every.as_secs());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match store.purge_expired(ttl).await {
                Ok(0) => {}
                Ok(count) => tracing::info!("Purged {} expired files", count),
                Err(e) => tracing::warn!("Artifact sweep failed: {}", e),
            }
        }
    });
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
