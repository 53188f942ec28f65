use axum::{Json, extract::State, response::IntoResponse};
use pitfight_core::events::FightCommand;
use tokio::sync::oneshot;

use super::AdminApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /fights` — the engine's full fight set, raw entities included.
pub async fn list_fights(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .fight
        .send(FightCommand::List { reply })
        .await
        .map_err(|_| AdminApiError::ChannelClosed)?;

    let mut fights = response.await.map_err(|_| AdminApiError::ChannelClosed)?;
    fights.sort_by_key(|fight| fight.created_at);
    Ok(Json(fights))
}
