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
pub struct PlaceWagerRequest {
    pub bettor_id: String,
    pub amount: i64,
    /// Which fighter slot the stake backs: 0 or 1.
    pub side: usize,
}

/// `POST /fights/{fight_id}/wagers` — stake money on a pending fight.
pub async fn place_wager(
    State(state): State<AppState>,
    Path(fight_id): Path<Uuid>,
    Json(payload): Json<PlaceWagerRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .fight
        .send(FightCommand::PlaceWager {
            fight_id,
            bettor_id: payload.bettor_id,
            amount: payload.amount,
            side: payload.side,
            reply,
        })
        .await
        .map_err(|_| UserApiError::ChannelClosed)?;

    let wager = response
        .await
        .map_err(|_| UserApiError::ChannelClosed)?
        .map_err(UserApiError::Wager)?;
    Ok((StatusCode::CREATED, Json(wager)))
}
