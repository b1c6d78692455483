//! Error types for the API layer.
//!
//! [`ApiError`] converts into an Axum response with the
//! `{"success": false, "error": ...}` body every endpoint uses. Server-side
//! failures are logged at `error` and reported without internals; client
//! errors are logged at `debug`.

use abandon_core::GameError;
use abandon_types::ErrorResponse;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The engine or query façade rejected the request.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The request body or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// No route or resource matched.
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Game(err) => match err {
                GameError::Validation(_)
                | GameError::ProofOfWork(_)
                | GameError::TargetAlreadyEliminated(_) => StatusCode::BAD_REQUEST,
                GameError::TargetNotFound(_) => StatusCode::NOT_FOUND,
                GameError::DuplicateHash { .. } => StatusCode::CONFLICT,
                GameError::StorageUnavailable(_) | GameError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            String::from("Internal server error")
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
            self.to_string()
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_map_to_statuses() {
        let cases = [
            (GameError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                GameError::TargetAlreadyEliminated("000a".into()),
                StatusCode::BAD_REQUEST,
            ),
            (GameError::TargetNotFound("000a".into()), StatusCode::NOT_FOUND),
            (
                GameError::DuplicateHash {
                    kind: "Virus",
                    hash: "000a".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                GameError::StorageUnavailable("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn server_errors_hide_details() {
        let response =
            ApiError::from(GameError::StorageUnavailable("pg down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
