//! Background server startup.
//!
//! [`spawn_server`] binds eagerly, so address errors surface to the
//! caller, then serves on a background Tokio task. Binding port 0 picks a
//! free port; the bound address is returned.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A running background server.
#[derive(Debug)]
pub struct RunningServer {
    /// The address actually bound.
    pub addr: SocketAddr,
    /// Resolves when the server stops.
    pub handle: JoinHandle<Result<(), ServerError>>,
}

/// Bind and serve on a background task until `shutdown` completes.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is invalid or cannot
/// be bound.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<RunningServer, StartupError> {
    let listener = bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(serve(listener, state, shutdown));
    tracing::info!(%addr, "API server spawned on background task");

    Ok(RunningServer { addr, handle })
}
