use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use super::AdminApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /fighters/{fighter_id}` — the full stored profile, betting
/// stats included.
pub async fn show_fighter(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(fighter_id): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    let profile = state
        .store
        .load_fighter(&fighter_id)
        .await?
        .ok_or(AdminApiError::NotFound)?;
    Ok(Json(profile))
}
