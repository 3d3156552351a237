//! HTTP API handlers.
//!
//! # Endpoints
//!
//! - `POST /api/start`  – open a giveaway
//! - `POST /api/stop`   – close entries
//! - `POST /api/reroll` – draw a winner
//! - `POST /api/clear`  – empty the participant list
//! - `GET  /api/status` – current giveaway state
//! - `GET  /ws`         – viewer feed (WebSocket)

use axum::{http::StatusCode, response::IntoResponse};
use chatdraw_core::processors::CoordinatorUnavailable;

pub mod control;
pub mod extractors;
pub mod feed;

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The coordinator task has stopped (shutdown in progress).
    Unavailable,
}

impl From<CoordinatorUnavailable> for ApiError {
    fn from(_: CoordinatorUnavailable) -> Self {
        ApiError::Unavailable
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Unavailable => {
                tracing::warn!("Control request while the coordinator is not running");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "giveaway coordinator is not running",
                )
                    .into_response()
            }
        }
    }
}
