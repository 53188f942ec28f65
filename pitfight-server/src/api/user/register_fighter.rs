use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use pitfight_core::entities::FighterProfile;
use serde::Deserialize;

use super::UserApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterFighterRequest {
    pub id: String,
    pub name: String,
}

/// `POST /fighters` — register a fighter profile.
///
/// Idempotent: an existing profile is returned unchanged, so clients
/// can call this on every login.
pub async fn register_fighter(
    State(state): State<AppState>,
    Json(payload): Json<RegisterFighterRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    if let Some(existing) = state.store.load_fighter(&payload.id).await? {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let profile = FighterProfile::new(payload.id, payload.name, state.game.skill.base_rating);
    state.store.save_fighter(&profile).await?;
    tracing::info!(fighter_id = %profile.id, "fighter registered");
    Ok((StatusCode::CREATED, Json(profile)))
}
