use axum::{Json, extract::State, response::IntoResponse};
use pitfight_core::events::QueueCommand;
use tokio::sync::oneshot;

use super::AdminApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /queue` — current queue tickets with wait and relaxation.
pub async fn show_queue(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .queue
        .send(QueueCommand::Snapshot { reply })
        .await
        .map_err(|_| AdminApiError::ChannelClosed)?;

    let tickets = response.await.map_err(|_| AdminApiError::ChannelClosed)?;
    Ok(Json(tickets))
}
