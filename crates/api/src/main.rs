use std::net::SocketAddr;
use std::sync::Arc;

use folio_api::config::ServerConfig;
use folio_api::media::cloudinary::CloudinaryHost;
use folio_api::media::{MediaHost, UnconfiguredMediaHost};
use folio_api::router::build_app_router;
use folio_api::state::AppState;
use folio_db::{Repositories, Stores};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_api=debug,folio_db=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        data_dir = %config.data_dir.display(),
        "Loaded server configuration"
    );

    // --- Storage ---
    let repos = Repositories::open(Stores::json_files(&config.data_dir), &config.admin)
        .await
        .expect("Failed to open data store");
    tracing::info!("Collections loaded");

    // --- Media host ---
    let media: Arc<dyn MediaHost> = match config.cloudinary.clone() {
        Some(cloudinary) => {
            tracing::info!(cloud_name = %cloudinary.cloud_name, "Image uploads go to Cloudinary");
            Arc::new(CloudinaryHost::new(cloudinary))
        }
        None => {
            tracing::warn!("Cloudinary is not configured, image uploads are disabled");
            Arc::new(UnconfiguredMediaHost)
        }
    };

    // --- App state ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState {
        repos: repos.clone(),
        config: Arc::new(config),
        media,
    };
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, flushing collections");
    match repos.flush_all().await {
        Ok(()) => tracing::info!("Graceful shutdown complete"),
        Err(e) => tracing::error!(error = %e, "Failed to flush collections on shutdown"),
    }
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
