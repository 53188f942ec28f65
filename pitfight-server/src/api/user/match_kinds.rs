use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct MatchKindResponse {
    index: usize,
    name: String,
    description: String,
    melee_only: bool,
    entry_fee: i64,
    winner_reward: i64,
}

/// `GET /match-kinds` — list the configured match kinds with the
/// indexes used by `POST /queue/join`.
pub async fn list_match_kinds(State(state): State<AppState>) -> impl IntoResponse {
    let kinds: Vec<MatchKindResponse> = state
        .game
        .match_kinds
        .iter()
        .enumerate()
        .map(|(index, kind)| MatchKindResponse {
            index,
            name: kind.name.clone(),
            description: kind.description.clone(),
            melee_only: kind.melee_only,
            entry_fee: kind.entry_fee,
            winner_reward: kind.winner_reward,
        })
        .collect();
    Json(kinds)
}
