//! HTTP API.
//!
//! The user API is the host integration surface: the game client (or a
//! gateway fronting it) calls these endpoints on behalf of fighters.
//! The admin API requires the `Authorization: Bearer` token from the
//! config file.

pub mod admin;
pub mod extractors;
pub mod user;

use pitfight_core::entities::{Fight, FighterSlot};
use serde::Serialize;
use uuid::Uuid;

/// Fight representation returned by the API.
#[derive(Debug, Serialize)]
pub struct FightResponse {
    pub id: Uuid,
    pub arena: String,
    pub kind: String,
    pub status: pitfight_core::entities::FightStatus,
    pub round: u32,
    pub total_rounds: u32,
    pub fighters: [FighterView; 2],
    pub winner: Option<String>,
    pub odds: [f64; 2],
    pub created_at: i64,
}

/// One side of a fight as shown to clients.
#[derive(Debug, Serialize)]
pub struct FighterView {
    pub id: String,
    pub name: String,
    pub rating: i32,
    pub health: i32,
    pub ready: bool,
}

fn slot_view(slot: &FighterSlot) -> FighterView {
    FighterView {
        id: slot.profile.id.clone(),
        name: slot.profile.name.clone(),
        rating: slot.profile.rating,
        health: slot.health,
        ready: slot.ready,
    }
}

pub(crate) fn fight_to_response(fight: &Fight) -> FightResponse {
    FightResponse {
        id: fight.id,
        arena: fight.arena_name.clone(),
        kind: fight.kind.name.clone(),
        status: fight.status,
        round: fight.round,
        total_rounds: fight.total_rounds,
        fighters: [slot_view(&fight.slots[0]), slot_view(&fight.slots[1])],
        winner: fight.winner.clone(),
        odds: fight.odds,
        created_at: fight.created_at.unix_timestamp(),
    }
}
