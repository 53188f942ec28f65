use axum::{Json, extract::State, response::IntoResponse};

use super::UserApiError;
use crate::state::AppState;

/// `GET /leaderboard` — top fighters by rating, served from the TTL
/// cache.
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, UserApiError> {
    let entries = state.leaderboard.entries(state.store.as_ref()).await?;
    Ok(Json(entries))
}
