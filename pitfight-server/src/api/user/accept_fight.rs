use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use pitfight_core::events::FightCommand;
use serde::Deserialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::UserApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AcceptFightRequest {
    pub fighter_id: String,
}

/// `POST /fights/{fight_id}/accept` — signal readiness. The fight
/// starts once both sides have accepted.
pub async fn accept_fight(
    State(state): State<AppState>,
    Path(fight_id): Path<Uuid>,
    Json(payload): Json<AcceptFightRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .fight
        .send(FightCommand::Accept {
            fight_id,
            fighter_id: payload.fighter_id,
            reply,
        })
        .await
        .map_err(|_| UserApiError::ChannelClosed)?;

    let accepted = response.await.map_err(|_| UserApiError::ChannelClosed)?;
    if !accepted {
        return Err(UserApiError::Refused);
    }
    Ok(StatusCode::NO_CONTENT)
}
