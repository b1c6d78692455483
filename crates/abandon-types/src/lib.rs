//! Shared type definitions for the abandon.ai virus vs vaccine game.
//!
//! This crate is the single source of truth for every type that crosses a
//! crate or network boundary. Types flow downstream to `TypeScript` via
//! `ts-rs` for the web client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for record identifiers
//! - [`records`] -- Virus and vaccine records and the virus lifecycle
//! - [`stats`] -- Aggregate statistics and pagination metadata
//! - [`messages`] -- Engine events and push-channel frames
//! - [`api`] -- HTTP request and response bodies

pub mod api;
pub mod ids;
pub mod messages;
pub mod records;
pub mod stats;

// Re-export all public types at crate root for convenience.
pub use api::{
    AgentResponse, CreateVaccineRequest, CreateVirusRequest, ErrorResponse, HealthResponse,
    PageResponse, SearchResponse, VaccineResponse, VirusResponse,
};
pub use ids::{VaccineId, VirusId};
pub use messages::{
    ClientMessage, GameEvent, History, ServerMessage, StatusSnapshot, VirusCreated,
    VirusEliminated,
};
pub use records::{Vaccine, Virus, VirusStatus};
pub use stats::{AgentStats, GameStats, Page, Pagination};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::VirusId::export_all();
        let _ = crate::ids::VaccineId::export_all();

        let _ = crate::records::VirusStatus::export_all();
        let _ = crate::records::Virus::export_all();
        let _ = crate::records::Vaccine::export_all();

        let _ = crate::stats::GameStats::export_all();
        let _ = crate::stats::AgentStats::export_all();
        let _ = crate::stats::Pagination::export_all();

        let _ = crate::messages::StatusSnapshot::export_all();
        let _ = crate::messages::History::export_all();
        let _ = crate::messages::ServerMessage::export_all();
        let _ = crate::messages::ClientMessage::export_all();

        let _ = crate::api::CreateVirusRequest::export_all();
        let _ = crate::api::CreateVaccineRequest::export_all();
        let _ = crate::api::VirusResponse::export_all();
        let _ = crate::api::VaccineResponse::export_all();
        let _ = crate::api::SearchResponse::export_all();
        let _ = crate::api::AgentResponse::export_all();
        let _ = crate::api::ErrorResponse::export_all();
    }
}
