//! Server binary for the abandon.ai virus vs vaccine game.
//!
//! Wires configuration, record store, game engine and the HTTP/`WebSocket`
//! API together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `abandon-config.yaml` (or `ABANDON_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the record store (`PostgreSQL` if configured, else in-memory)
//! 4. Load the game engine state from the store
//! 5. Start the API server
//! 6. Wait for shutdown, then close the pool

mod error;

use std::sync::Arc;
use std::time::Duration;

use abandon_api::{AppState, ServerConfig};
use abandon_core::{AppConfig, DatabaseConfig, EventHub, GameEngine, LoggingConfig};
use abandon_db::{MemoryStore, PostgresConfig, PostgresStore, RecordStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the server itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = AppConfig::load().map_err(AppError::from)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        host = %config.server.host,
        port = config.server.port,
        persistent = config.database.url.is_some(),
        "abandon-server starting"
    );

    // 3. Open the record store.
    let (store, postgres) = open_store(&config.database).await?;

    // 4. Load engine state.
    let hub = EventHub::new(config.game.broadcast_capacity);
    let engine = GameEngine::load(store, hub, config.game.clone())
        .await
        .map_err(AppError::from)?;
    let state = Arc::new(AppState::new(Arc::new(engine)));

    // 5. Start the API server.
    let server_config = ServerConfig::from(&config.server);
    let server = abandon_api::spawn_server(
        &server_config,
        state,
        abandon_api::server::shutdown_signal(),
    )
    .await
    .map_err(AppError::from)?;
    info!(addr = %server.addr, "abandon-server ready");

    // 6. Wait for shutdown.
    let result = server.handle.await.map_err(|e| AppError::Task {
        message: e.to_string(),
    })?;

    if let Some(postgres) = postgres {
        postgres.close().await;
    }
    result.map_err(AppError::from)?;

    info!("abandon-server stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Open the configured record store.
///
/// The `PostgreSQL` store is also returned on its own so its pool can be
/// closed on shutdown.
async fn open_store(
    database: &DatabaseConfig,
) -> Result<(Arc<dyn RecordStore>, Option<PostgresStore>), AppError> {
    let Some(url) = database.url.as_deref() else {
        info!("No database URL configured, using in-memory store");
        return Ok((Arc::new(MemoryStore::new()), None));
    };

    let postgres = PostgresStore::connect(&PostgresConfig {
        max_connections: database.max_connections,
        acquire_timeout: Duration::from_secs(database.connect_timeout_secs),
        run_migrations: database.run_migrations,
        ..PostgresConfig::new(url)
    })
    .await?;
    Ok((Arc::new(postgres.clone()), Some(postgres)))
}
