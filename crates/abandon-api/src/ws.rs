//! `WebSocket` push channel.
//!
//! Clients connect to `GET /ws`. On connect the server sends a
//! `STATUS_UPDATE`, then forwards every committed `VIRUS_CREATED` and
//! `VIRUS_ELIMINATED` event. Clients may send `GET_STATUS` or
//! `GET_HISTORY`; anything else gets an `ERROR` frame sent to that client
//! only.
//!
//! If a client falls behind, lagged events are skipped and the client
//! resumes from the most recent one.

use std::sync::Arc;

use abandon_types::{ClientMessage, ErrorResponse, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Error text for frames that are not a known client message.
pub const INVALID_MESSAGE: &str = "Invalid message format";

/// Upgrade an HTTP request to the push channel.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize and send one frame. Returns `false` once the client is gone.
async fn send(socket: &mut WebSocket, message: &ServerMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize push frame: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Build the reply to a client text frame.
async fn reply_to(state: &AppState, text: &str) -> ServerMessage {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::GetStatus) => ServerMessage::StatusUpdate(state.engine.status().await),
        Ok(ClientMessage::GetHistory { limit }) => match state.engine.history(limit).await {
            Ok(history) => ServerMessage::HistoryUpdate(history),
            Err(e) => {
                warn!(error = %e, "History request failed");
                ServerMessage::Error(ErrorResponse::new("Failed to load history"))
            }
        },
        Err(e) => {
            debug!(error = %e, "Malformed client frame");
            ServerMessage::Error(ErrorResponse::new(INVALID_MESSAGE))
        }
    }
}

/// Handle the connection lifecycle: subscribe, send the initial snapshot,
/// then interleave broadcast events with client requests.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before the snapshot so no event between the two is lost.
    let mut rx = state.subscribe();
    debug!(observers = state.engine.hub().observer_count(), "WebSocket client connected");

    let snapshot = ServerMessage::StatusUpdate(state.engine.status().await);
    if !send(&mut socket, &snapshot).await {
        debug!("WebSocket client disconnected (initial status failed)");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if !send(&mut socket, &ServerMessage::from(event)).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Event hub closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Text(text))) => {
                        let reply = reply_to(&state, text.as_str()).await;
                        if !send(&mut socket, &reply).await {
                            debug!("WebSocket client disconnected (reply failed)");
                            return;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let reply = ServerMessage::Error(ErrorResponse::new(INVALID_MESSAGE));
                        if !send(&mut socket, &reply).await {
                            return;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use abandon_core::{EventHub, GameConfig, GameEngine};
    use abandon_db::MemoryStore;

    use super::*;

    fn state() -> AppState {
        let engine = GameEngine::new(
            Arc::new(MemoryStore::new()),
            EventHub::new(8),
            GameConfig::default(),
        );
        AppState::new(Arc::new(engine))
    }

    #[tokio::test]
    async fn get_status_replies_with_snapshot() {
        let reply = reply_to(&state(), r#"{"type":"GET_STATUS"}"#).await;
        assert!(matches!(reply, ServerMessage::StatusUpdate(s) if s.active_viruses.is_empty()));
    }

    #[tokio::test]
    async fn get_history_replies_with_history() {
        let reply = reply_to(&state(), r#"{"type":"GET_HISTORY","limit":5}"#).await;
        assert!(matches!(reply, ServerMessage::HistoryUpdate(_)));
    }

    #[tokio::test]
    async fn garbage_gets_an_error_frame() {
        for text in ["hello", r#"{"type":"NUKE"}"#, "{}"] {
            let reply = reply_to(&state(), text).await;
            let json = serde_json::to_value(&reply).unwrap();
            assert_eq!(json["type"], "ERROR");
            assert_eq!(json["error"], INVALID_MESSAGE);
        }
    }
}
