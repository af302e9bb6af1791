//! HTTP server lifecycle.
//!
//! Binds the router, serves until a shutdown signal, and runs the periodic
//! session cleanup task alongside.

use crate::routes::AppState;
use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Interval between expired-session sweeps.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the HTTP server until `shutdown` resolves.
pub async fn run_server(
    router: Router,
    listen_addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;

    info!("Listening on http://{}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

/// Spawn the background task that purges expired sessions.
pub fn spawn_session_cleanup(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match state.sessions.cleanup_expired_sessions().await {
                Ok(0) => debug!("Session cleanup: nothing to purge"),
                Ok(n) => info!("Session cleanup: purged {} expired session(s)", n),
                Err(e) => warn!("Session cleanup failed: {}", e),
            }
        }
    })
}
