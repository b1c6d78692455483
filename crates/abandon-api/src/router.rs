//! Axum router construction.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`] with
//! permissive CORS for browser clients and HTTP request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- health check
/// - `GET /ws` -- `WebSocket` push channel
/// - `POST|GET /api/virus` -- submit / page viruses
/// - `GET /api/virus/search` -- search viruses
/// - `POST|GET /api/vaccine` -- submit / page vaccines
/// - `GET /api/status` -- active viruses + stats
/// - `GET /api/history` -- recent records
/// - `GET /api/agents/{address}` -- per-identity summary
///
/// Unknown paths return 404 with the standard error body.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/", get(handlers::health))
        // WebSocket
        .route("/ws", get(ws::ws_handler))
        // Records
        .route(
            "/api/virus",
            get(handlers::list_viruses).post(handlers::create_virus),
        )
        .route("/api/virus/search", get(handlers::search_viruses))
        .route(
            "/api/vaccine",
            get(handlers::list_vaccines).post(handlers::create_vaccine),
        )
        // Game state
        .route("/api/status", get(handlers::get_status))
        .route("/api/history", get(handlers::get_history))
        .route("/api/agents/{address}", get(handlers::get_agent))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
