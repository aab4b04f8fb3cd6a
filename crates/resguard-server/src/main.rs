//! resguard reference server.
//!
//! - Config: `resguard.yaml`, or the path in `RESGUARD_CONFIG`
//! - Routes: `/healthz`, and conventional resource paths on `/*path`
//! - Logging: `RUST_LOG` via `EnvFilter`

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use resguard_core::error::{Result, ResguardError};
use resguard_server::{app_state, config, http};

const DEFAULT_CONFIG: &str = "resguard.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.client_code().as_str(), "resguard-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("RESGUARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let cfg = config::load_from_file(&path)?;
    // validate() already checked the format
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .map_err(|_| ResguardError::BadRequest(format!("invalid listen address: {}", cfg.server.listen)))?;

    let state = app_state::AppState::new(cfg)?;
    let app = http::build_router(state);

    tracing::info!(%listen, config = %path, "resguard-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ResguardError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ResguardError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
