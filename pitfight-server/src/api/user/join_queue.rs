use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use pitfight_core::events::QueueCommand;
use serde::Deserialize;
use tokio::sync::oneshot;

use super::UserApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JoinQueueRequest {
    pub fighter_id: String,
    pub kind_index: usize,
}

/// `POST /queue/join` — enter the matchmaking queue. Charges the match
/// kind's entry fee.
pub async fn join_queue(
    State(state): State<AppState>,
    Json(payload): Json<JoinQueueRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .queue
        .send(QueueCommand::Join {
            fighter_id: payload.fighter_id,
            kind_index: payload.kind_index,
            reply,
        })
        .await
        .map_err(|_| UserApiError::ChannelClosed)?;

    response
        .await
        .map_err(|_| UserApiError::ChannelClosed)?
        .map_err(UserApiError::Queue)?;
    Ok(StatusCode::NO_CONTENT)
}
