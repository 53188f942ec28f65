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
pub struct ReportDamageRequest {
    pub attacker_id: String,
    pub amount: u32,
}

/// `POST /fights/{fight_id}/damage` — report damage landed by one
/// side, taken from live game telemetry.
pub async fn report_damage(
    State(state): State<AppState>,
    Path(fight_id): Path<Uuid>,
    Json(payload): Json<ReportDamageRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let (reply, response) = oneshot::channel();
    state
        .commands
        .fight
        .send(FightCommand::Damage {
            fight_id,
            attacker_id: payload.attacker_id,
            amount: payload.amount,
            reply,
        })
        .await
        .map_err(|_| UserApiError::ChannelClosed)?;

    let applied = response.await.map_err(|_| UserApiError::ChannelClosed)?;
    if !applied {
        return Err(UserApiError::Refused);
    }
    Ok(StatusCode::NO_CONTENT)
}
