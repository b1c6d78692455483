//! Push-channel messages and engine events.
//!
//! [`GameEvent`] is what the engine publishes after a committed mutation.
//! [`ServerMessage`] is the JSON frame observers receive over the
//! `WebSocket`; [`ClientMessage`] is what they may send back.
//!
//! Frames are internally tagged by `type` in `SCREAMING_SNAKE_CASE`, e.g.
//! `{"type":"VIRUS_CREATED","virus":{..},"stats":{..}}`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::ErrorResponse;
use crate::records::{Vaccine, Virus};
use crate::stats::GameStats;

/// Active viruses plus the stats snapshot taken with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatusSnapshot {
    /// Currently active viruses, newest first.
    pub active_viruses: Vec<Virus>,
    /// Aggregates consistent with `active_viruses`.
    pub stats: GameStats,
}

/// Most-recent-first records of both kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct History {
    /// Recent viruses (any status), newest first.
    pub viruses: Vec<Virus>,
    /// Recent vaccines, newest first.
    pub vaccines: Vec<Vaccine>,
}

/// Payload of a virus creation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VirusCreated {
    /// The new virus.
    pub virus: Virus,
    /// Stats immediately after the creation.
    pub stats: GameStats,
}

/// Payload of a virus elimination event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VirusEliminated {
    /// The virus, now eliminated.
    pub virus: Virus,
    /// The vaccine that eliminated it.
    pub vaccine: Vaccine,
    /// Stats immediately after the elimination.
    pub stats: GameStats,
}

/// A committed state change published by the game engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A virus was created.
    VirusCreated(VirusCreated),
    /// A virus was eliminated by a vaccine.
    VirusEliminated(VirusEliminated),
}

impl GameEvent {
    /// The stats snapshot carried by this event.
    pub const fn stats(&self) -> &GameStats {
        match self {
            Self::VirusCreated(e) => &e.stats,
            Self::VirusEliminated(e) => &e.stats,
        }
    }
}

/// Frames sent from the server to push-channel observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// Full status snapshot (on connect and on `GET_STATUS`).
    StatusUpdate(StatusSnapshot),
    /// A virus was created.
    VirusCreated(VirusCreated),
    /// A virus was eliminated.
    VirusEliminated(VirusEliminated),
    /// Reply to `GET_HISTORY`.
    HistoryUpdate(History),
    /// Error unicast to the connection that caused it.
    Error(ErrorResponse),
}

impl From<GameEvent> for ServerMessage {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::VirusCreated(e) => Self::VirusCreated(e),
            GameEvent::VirusEliminated(e) => Self::VirusEliminated(e),
        }
    }
}

/// Frames observers may send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Request a fresh [`ServerMessage::StatusUpdate`].
    GetStatus,
    /// Request a [`ServerMessage::HistoryUpdate`].
    GetHistory {
        /// Maximum records per kind; clamped server-side.
        #[serde(default)]
        #[ts(optional)]
        limit: Option<u64>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_from_wire_names() {
        let status: ClientMessage = serde_json::from_str(r#"{"type":"GET_STATUS"}"#).unwrap();
        assert_eq!(status, ClientMessage::GetStatus);

        let history: ClientMessage =
            serde_json::from_str(r#"{"type":"GET_HISTORY","limit":25}"#).unwrap();
        assert_eq!(history, ClientMessage::GetHistory { limit: Some(25) });

        let bare: ClientMessage = serde_json::from_str(r#"{"type":"GET_HISTORY"}"#).unwrap();
        assert_eq!(bare, ClientMessage::GetHistory { limit: None });
    }

    #[test]
    fn unknown_client_message_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"DROP_TABLES"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }

    #[test]
    fn server_frames_are_tagged_and_flat() {
        let msg = ServerMessage::StatusUpdate(StatusSnapshot {
            active_viruses: Vec::new(),
            stats: GameStats::default(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "STATUS_UPDATE");
        assert!(json["activeViruses"].is_array());
        assert_eq!(json["stats"]["activeViruses"], 0);

        let err = ServerMessage::Error(ErrorResponse::new("Invalid message format"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "ERROR");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid message format");
    }
}
