//! Error types for the server binary.
//!
//! [`AppError`] wraps every failure mode during startup and serving so
//! `main` can propagate with `?`.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: abandon_core::ConfigError,
    },

    /// The record store could not be opened or migrated.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: abandon_db::StoreError,
    },

    /// The engine could not load its initial state.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: abandon_core::GameError,
    },

    /// The API server failed to start.
    #[error("startup error: {source}")]
    Startup {
        /// The underlying startup error.
        #[from]
        source: abandon_api::StartupError,
    },

    /// The API server stopped with an error.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: abandon_api::ServerError,
    },

    /// The server task panicked or was cancelled.
    #[error("server task failed: {message}")]
    Task {
        /// Description of the join failure.
        message: String,
    },
}
