use axum::{Json, extract::State, response::IntoResponse};
use pitfight_core::events::FightCommand;
use tokio::sync::oneshot;

use super::UserApiError;
use crate::api::fight_to_response;
use crate::state::AppState;

/// `GET /fights` — every fight the engine currently tracks, including
/// recently finished ones.
pub async fn list_fights(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, UserApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .fight
        .send(FightCommand::List { reply })
        .await
        .map_err(|_| UserApiError::ChannelClosed)?;

    let mut fights = response.await.map_err(|_| UserApiError::ChannelClosed)?;
    fights.sort_by_key(|fight| fight.created_at);
    let body: Vec<_> = fights.iter().map(fight_to_response).collect();
    Ok(Json(body))
}
