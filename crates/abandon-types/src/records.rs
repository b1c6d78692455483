//! Virus and vaccine records.
//!
//! A [`Virus`] is created by a successful proof-of-work submission and is
//! mutated exactly once, when a [`Vaccine`] eliminates it. Vaccines are
//! immutable once written. Neither record is ever deleted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{VaccineId, VirusId};

/// Lifecycle state of a virus.
///
/// The only legal transition is `Active -> Eliminated`; `Eliminated` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VirusStatus {
    /// The virus is live and may be targeted by vaccines.
    Active,
    /// The virus was eliminated by a successful vaccine.
    Eliminated,
}

impl VirusStatus {
    /// The database / wire representation of this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Eliminated => "eliminated",
        }
    }

    /// Parse the database representation back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "eliminated" => Some(Self::Eliminated),
            _ => None,
        }
    }
}

impl core::fmt::Display for VirusStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A virus minted by proof of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Virus {
    /// Server-assigned identifier.
    pub id: VirusId,
    /// Lowercase hex SHA-256 digest of the virus message. Globally unique.
    pub hash: String,
    /// Identity (wallet address) of the creator.
    pub created_by: String,
    /// Server time of creation, unix seconds.
    #[ts(type = "number")]
    pub created_at: i64,
    /// Client-supplied timestamp that was hashed.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Client-supplied nonce that was hashed.
    #[ts(type = "number")]
    pub nonce: u64,
    /// Required leading zero hex digits, in `[3, 10]`.
    pub difficulty: u32,
    /// Optional hex payload attached by the creator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub memo: Option<String>,
    /// Current lifecycle state.
    pub status: VirusStatus,
    /// Identity of the eliminating vaccine's creator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub eliminated_by: Option<String>,
    /// Server time of elimination, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub eliminated_at: Option<i64>,
}

impl Virus {
    /// Whether the virus can still be targeted.
    pub fn is_active(&self) -> bool {
        self.status == VirusStatus::Active
    }

    /// Apply the terminal `Active -> Eliminated` transition.
    ///
    /// Returns `false` and leaves the record untouched if it was already
    /// eliminated.
    pub fn eliminate(&mut self, by: &str, at: i64) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = VirusStatus::Eliminated;
        self.eliminated_by = Some(by.to_owned());
        self.eliminated_at = Some(at);
        true
    }
}

/// A vaccine mined against a target virus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Vaccine {
    /// Server-assigned identifier.
    pub id: VaccineId,
    /// Lowercase hex SHA-256 digest of the vaccine message.
    pub hash: String,
    /// Identity (wallet address) of the creator.
    pub created_by: String,
    /// Server time of creation, unix seconds.
    #[ts(type = "number")]
    pub created_at: i64,
    /// Hash of the virus this vaccine was mined against.
    pub target: String,
    /// Client-supplied timestamp that was hashed.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Client-supplied nonce that was hashed.
    #[ts(type = "number")]
    pub nonce: u64,
    /// Whether the vaccine eliminated its target.
    pub success: bool,
    /// The eliminated virus, set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub virus_id: Option<VirusId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_virus() -> Virus {
        Virus {
            id: VirusId::new(),
            hash: "000abc".to_owned(),
            created_by: "0xCreator".to_owned(),
            created_at: 1_738_454_400,
            timestamp: 1_738_454_400,
            nonce: 12_345,
            difficulty: 3,
            memo: None,
            status: VirusStatus::Active,
            eliminated_by: None,
            eliminated_at: None,
        }
    }

    #[test]
    fn virus_serializes_camel_case_without_empty_optionals() {
        let json = serde_json::to_value(sample_virus()).unwrap();
        assert_eq!(json["createdBy"], "0xCreator");
        assert_eq!(json["status"], "active");
        assert!(json.get("memo").is_none());
        assert!(json.get("eliminatedBy").is_none());
    }

    #[test]
    fn elimination_is_terminal() {
        let mut virus = sample_virus();
        assert!(virus.eliminate("0xHealer", 1_738_454_500));
        assert_eq!(virus.status, VirusStatus::Eliminated);
        assert_eq!(virus.eliminated_by.as_deref(), Some("0xHealer"));

        assert!(!virus.eliminate("0xLate", 1_738_454_600));
        assert_eq!(virus.eliminated_by.as_deref(), Some("0xHealer"));
        assert_eq!(virus.eliminated_at, Some(1_738_454_500));
    }

    #[test]
    fn status_round_trips_through_db_text() {
        for status in [VirusStatus::Active, VirusStatus::Eliminated] {
            assert_eq!(VirusStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VirusStatus::parse("dormant"), None);
    }
}
