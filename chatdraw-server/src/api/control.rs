//! Control API handlers, called by the streamer's panel.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chatdraw_core::ledger::Status;
use chatdraw_sdk::objects::{RerollResponse, StartGiveaway, StatusResponse, SuccessResponse};

use super::ApiError;
use super::extractors::LenientBody;
use crate::state::AppState;

/// Build the control API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/reroll", post(reroll))
        .route("/clear", post(clear))
        .route("/status", get(status))
}

/// `POST /api/start` — open a new giveaway.
///
/// Missing or unusable `keyword` / `maxSpam` fall back to the defaults.
async fn start(
    State(state): State<AppState>,
    LenientBody(body): LenientBody<StartGiveaway>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let max_spam = body.max_spam_value();
    state.coordinator.start(body.keyword, max_spam).await?;
    Ok(Json(SuccessResponse::OK))
}

/// `POST /api/stop` — close entries, keeping the participant list.
async fn stop(State(state): State<AppState>) -> Result<Json<SuccessResponse>, ApiError> {
    state.coordinator.stop().await?;
    Ok(Json(SuccessResponse::OK))
}

/// `POST /api/reroll` — draw a winner, `null` if nobody entered.
async fn reroll(State(state): State<AppState>) -> Result<Json<RerollResponse>, ApiError> {
    let winner = state.coordinator.reroll().await?;
    Ok(Json(RerollResponse {
        winner: winner.map(|w| w.to_string()),
    }))
}

/// `POST /api/clear` — empty the participant list.
async fn clear(State(state): State<AppState>) -> Result<Json<SuccessResponse>, ApiError> {
    state.coordinator.clear().await?;
    Ok(Json(SuccessResponse::OK))
}

/// `GET /api/status`
async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.coordinator.status().await?;
    Ok(Json(to_response(status)))
}

fn to_response(status: Status) -> StatusResponse {
    StatusResponse {
        giveaway_active: status.active,
        participants_count: status.participant_count,
        keyword: status.keyword.to_string(),
        max_spam: status.max_attempts,
    }
}
