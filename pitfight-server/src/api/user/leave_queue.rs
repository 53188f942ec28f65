use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use pitfight_core::events::QueueCommand;
use serde::Deserialize;
use tokio::sync::oneshot;

use super::UserApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaveQueueRequest {
    pub fighter_id: String,
}

/// `POST /queue/leave` — withdraw from the queue. The entry fee comes
/// back.
pub async fn leave_queue(
    State(state): State<AppState>,
    Json(payload): Json<LeaveQueueRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .queue
        .send(QueueCommand::Leave {
            fighter_id: payload.fighter_id,
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
