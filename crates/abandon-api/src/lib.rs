//! HTTP + `WebSocket` API for the abandon.ai virus vs vaccine game.
//!
//! Thin Axum layer over [`abandon_core`]: handlers decode requests, call the
//! engine or query façade, and map [`abandon_core::GameError`] to status
//! codes. The `/ws` push channel forwards engine events to every connected
//! observer.
//!
//! # Modules
//!
//! - [`router`] -- Route table, CORS and tracing layers
//! - [`handlers`] -- REST handlers
//! - [`ws`] -- `WebSocket` push channel
//! - [`state`] -- Shared handler state
//! - [`server`] -- Bind / serve / graceful shutdown
//! - [`startup`] -- Background spawning for the binary and tests
//! - [`error`] -- Error-to-response mapping

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{RunningServer, StartupError, spawn_server};
pub use state::AppState;
