//! item-server: loads settings, builds the selected store, and serves the item API.
//!
//! Run from repo root: `cargo run -p item-server`

use item_service::{app, build_store, AppState, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;

    let default_level = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "item_service={level},item_server={level}",
                level = default_level
            ))
        }))
        .init();

    log_settings(&settings);

    let store = build_store(&settings).await.map_err(|e| {
        tracing::error!(storage = %settings.storage, error = %e, "storage unavailable, aborting startup");
        e
    })?;
    tracing::info!(storage = store.backend(), "storage ready");

    let addr = settings.listen_addr();
    let state = AppState::new(store.clone(), settings);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

fn log_settings(settings: &Settings) {
    for entry in settings.report() {
        tracing::info!("config {}", entry);
    }
    if settings.debug {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".into());
        let env_file = settings
            .env_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not found".into());
        tracing::debug!(working_directory = %cwd, env_file = %env_file, "debug information");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
