//! HTTP request and response bodies.
//!
//! Every response carries `success`. Submissions accept the submitter
//! identity as `creator`; `address` is accepted as an alias for older
//! clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::records::{Vaccine, Virus};
use crate::stats::{AgentStats, GameStats, Pagination};

/// Body of `POST /api/virus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateVirusRequest {
    /// Submitter identity.
    #[serde(alias = "address")]
    pub creator: String,
    /// Client timestamp that was hashed.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Nonce that satisfies the difficulty.
    #[ts(type = "number")]
    pub nonce: u64,
    /// Chosen difficulty, `[3, 10]`.
    pub difficulty: u32,
    /// Optional hex memo, at most 1024 characters.
    #[serde(default)]
    #[ts(optional)]
    pub memo: Option<String>,
    /// Optional submitter signature, checked by a configured guard.
    #[serde(default)]
    #[ts(optional)]
    pub signature: Option<String>,
}

/// Body of `POST /api/vaccine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateVaccineRequest {
    /// Submitter identity.
    #[serde(alias = "address")]
    pub creator: String,
    /// Hash of the virus to eliminate.
    pub target: String,
    /// Client timestamp that was hashed.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Nonce that satisfies the target's difficulty.
    #[ts(type = "number")]
    pub nonce: u64,
    /// Optional submitter signature, checked by a configured guard.
    #[serde(default)]
    #[ts(optional)]
    pub signature: Option<String>,
}

/// Response to a successful virus submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VirusResponse {
    /// Always `true`.
    pub success: bool,
    /// The stored virus.
    pub virus: Virus,
    /// Stats after the creation.
    pub stats: GameStats,
}

/// Response to a successful vaccine submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VaccineResponse {
    /// Always `true`.
    pub success: bool,
    /// The stored vaccine.
    pub vaccine: Vaccine,
    /// The target virus, now eliminated.
    pub virus: Virus,
    /// Stats after the elimination.
    pub stats: GameStats,
}

/// A page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Records on this page, newest first.
    pub items: Vec<T>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

/// Response to `GET /api/virus/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SearchResponse {
    /// Always `true`.
    pub success: bool,
    /// Exact matches on hash or creator, newest first.
    pub viruses: Vec<Virus>,
}

/// Response to `GET /api/agents/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentResponse {
    /// Always `true`.
    pub success: bool,
    /// Participation summary for the requested identity.
    pub agent: AgentStats,
}

/// Response to `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HealthResponse {
    /// Service name.
    pub service: String,
    /// Crate version.
    pub version: String,
    /// `"healthy"` when serving.
    pub status: String,
}

/// Body of every error response and push-channel error frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable reason.
    pub error: String,
}

impl ErrorResponse {
    /// Build an error body with `success: false`.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn virus_request_accepts_legacy_address_field() {
        let body = r#"{"address":"0xabc","timestamp":1,"nonce":2,"difficulty":3}"#;
        let req: CreateVirusRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.creator, "0xabc");
        assert_eq!(req.memo, None);
        assert_eq!(req.signature, None);
    }

    #[test]
    fn vaccine_request_requires_target() {
        let body = r#"{"creator":"0xabc","timestamp":1,"nonce":2}"#;
        assert!(serde_json::from_str::<CreateVaccineRequest>(body).is_err());
    }
}
