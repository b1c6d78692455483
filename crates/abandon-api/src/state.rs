//! Shared application state for the API server.
//!
//! [`AppState`] is handed to every handler behind an `Arc`. It holds the
//! game engine (mutations, status, history) and the query façade (paged
//! listings and search) built over the same record store.

use std::sync::Arc;

use abandon_core::{GameEngine, Queries};
use abandon_types::GameEvent;
use tokio::sync::broadcast;

/// State shared by all HTTP and `WebSocket` handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The game engine.
    pub engine: Arc<GameEngine>,
    /// Read-only listings over the record store.
    pub queries: Queries,
}

impl AppState {
    /// Wrap an engine, deriving the query façade from it.
    pub fn new(engine: Arc<GameEngine>) -> Self {
        let queries = engine.queries();
        Self { engine, queries }
    }

    /// Subscribe to committed game events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.engine.hub().subscribe()
    }
}
