//! Game logic for the abandon.ai virus vs vaccine server.
//!
//! This crate sits between the HTTP surface and the record store. It
//! validates submissions, applies the single `Active -> Eliminated` state
//! transition through the store's atomic operation, keeps the aggregate
//! stats cache, and fans committed events out to observers.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`engine`] -- The game state engine
//! - [`broadcast`] -- Event hub for push-channel observers
//! - [`guard`] -- Pluggable pre-validation checks
//! - [`query`] -- Paged listings and search
//! - [`error`] -- Engine error types

pub mod broadcast;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod query;

pub use broadcast::EventHub;
pub use config::{AppConfig, ConfigError, DatabaseConfig, GameConfig, LoggingConfig, ServerSection};
pub use engine::{GameEngine, VaccineSubmission, VirusSubmission};
pub use error::GameError;
pub use guard::{AcceptAll, Submission, SubmissionGuard, TimestampWindow};
pub use query::Queries;
