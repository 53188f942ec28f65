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
pub struct ForfeitFightRequest {
    pub fighter_id: String,
}

/// `POST /fights/{fight_id}/forfeit` — give up. Before the start this
/// abandons the fight; in progress it hands the win to the opponent.
pub async fn forfeit_fight(
    State(state): State<AppState>,
    Path(fight_id): Path<Uuid>,
    Json(payload): Json<ForfeitFightRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .fight
        .send(FightCommand::Forfeit {
            fight_id,
            fighter_id: payload.fighter_id,
            reply,
        })
        .await
        .map_err(|_| UserApiError::ChannelClosed)?;

    let forfeited = response.await.map_err(|_| UserApiError::ChannelClosed)?;
    if !forfeited {
        return Err(UserApiError::Refused);
    }
    Ok(StatusCode::NO_CONTENT)
}
