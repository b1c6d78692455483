//! Record store for the abandon.ai virus vs vaccine game.
//!
//! All reads and writes of virus and vaccine records go through the
//! [`RecordStore`] trait. Two backends ship with the crate:
//!
//! ```text
//! GameEngine
//!     |
//!     +-- Arc<dyn RecordStore>
//!         |-- MemoryStore    (no DATABASE_URL, tests)
//!         +-- PostgresStore  (pool + embedded migrations)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The `RecordStore` capability trait and ordering helpers
//! - [`memory`] -- In-process backend
//! - [`pg_store`] -- `PostgreSQL` backend, pool setup and migrations
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod pg_store;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use memory::MemoryStore;
pub use pg_store::{PostgresConfig, PostgresStore, VaccineRow, VirusRow};
pub use store::RecordStore;
