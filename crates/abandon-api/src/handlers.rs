//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Health check |
//! | `POST` | `/api/virus` | Submit a virus |
//! | `GET` | `/api/virus` | Page through active viruses |
//! | `GET` | `/api/virus/search` | Exact match on hash or creator |
//! | `POST` | `/api/vaccine` | Submit a vaccine |
//! | `GET` | `/api/vaccine` | Page through vaccines |
//! | `GET` | `/api/status` | Active viruses + stats |
//! | `GET` | `/api/history` | Recent viruses and vaccines |
//! | `GET` | `/api/agents/{address}` | Per-identity summary |
//!
//! Bodies and query strings are taken as `Result<_, Rejection>` so decode
//! failures come back as 400 with the standard error body.

use std::sync::Arc;

use abandon_types::{
    AgentResponse, CreateVaccineRequest, CreateVirusRequest, ErrorResponse, HealthResponse,
    History, PageResponse, SearchResponse, StatusSnapshot, Vaccine, VaccineResponse, Virus,
    VirusResponse,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "abandon.ai API";

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for paged listings.
#[derive(Debug, Default, serde::Deserialize)]
pub struct PageQuery {
    /// 1-based page (default 1).
    pub page: Option<u64>,
    /// Page size (default 30, clamped).
    pub limit: Option<u64>,
}

/// Query parameters for `GET /api/virus/search`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SearchQuery {
    /// Hash or creator to match exactly.
    pub q: Option<String>,
}

/// Query parameters for `GET /api/history`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct HistoryQuery {
    /// Records per kind (default 100, clamped to 1..=1000).
    pub limit: Option<u64>,
}

// ---------------------------------------------------------------------------
// GET / -- health
// ---------------------------------------------------------------------------

/// Report that the service is up.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        status: String::from("healthy"),
    })
}

// ---------------------------------------------------------------------------
// /api/virus
// ---------------------------------------------------------------------------

/// Validate and store a virus.
pub async fn create_virus(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateVirusRequest>, JsonRejection>,
) -> Result<Json<VirusResponse>, ApiError> {
    let Json(request) = payload?;
    let created = state.engine.submit_virus(request.into()).await?;
    Ok(Json(VirusResponse {
        success: true,
        virus: created.virus,
        stats: created.stats,
    }))
}

/// Page through active viruses, newest first.
pub async fn list_viruses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PageResponse<Virus>>, ApiError> {
    let Query(params) = query?;
    let page = state.queries.list_viruses(params.page, params.limit).await?;
    Ok(Json(PageResponse {
        success: true,
        items: page.items,
        pagination: page.pagination,
    }))
}

/// Find viruses by exact hash or creator.
pub async fn search_viruses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = query?;
    let viruses = state
        .queries
        .search_viruses(params.q.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(SearchResponse {
        success: true,
        viruses,
    }))
}

// ---------------------------------------------------------------------------
// /api/vaccine
// ---------------------------------------------------------------------------

/// Validate a vaccine and eliminate its target.
pub async fn create_vaccine(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateVaccineRequest>, JsonRejection>,
) -> Result<Json<VaccineResponse>, ApiError> {
    let Json(request) = payload?;
    let eliminated = state.engine.submit_vaccine(request.into()).await?;
    Ok(Json(VaccineResponse {
        success: true,
        vaccine: eliminated.vaccine,
        virus: eliminated.virus,
        stats: eliminated.stats,
    }))
}

/// Page through vaccines, newest first.
pub async fn list_vaccines(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PageResponse<Vaccine>>, ApiError> {
    let Query(params) = query?;
    let page = state.queries.list_vaccines(params.page, params.limit).await?;
    Ok(Json(PageResponse {
        success: true,
        items: page.items,
        pagination: page.pagination,
    }))
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// Active viruses and stats from the engine cache.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.engine.status().await)
}

/// Recent viruses and vaccines.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<History>, ApiError> {
    let Query(params) = query?;
    Ok(Json(state.engine.history(params.limit).await?))
}

/// Participation summary for one identity.
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent = state.engine.agent_stats(&address).await?;
    Ok(Json(AgentResponse {
        success: true,
        agent,
    }))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Catch-all for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}
