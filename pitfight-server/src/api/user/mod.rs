//! User API handlers.
//!
//! These endpoints are the host integration surface: the game client
//! or a gateway in front of it calls them on behalf of fighters.
//!
//! # Endpoints
//!
//! - `POST /fighters`                  – register a fighter profile
//! - `GET  /match-kinds`               – list configured match kinds
//! - `POST /queue/join`                – join the matchmaking queue
//! - `POST /queue/leave`               – leave the queue
//! - `GET  /fights`                    – list live fights
//! - `POST /fights/{fight_id}/accept`  – signal readiness
//! - `POST /fights/{fight_id}/forfeit` – give up
//! - `POST /fights/{fight_id}/damage`  – report telemetry damage
//! - `POST /fights/{fight_id}/wagers`  – place a wager
//! - `GET  /leaderboard`               – top fighters by rating

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use pitfight_core::ledger::WagerError;
use pitfight_core::processors::QueueError;
use pitfight_core::store::StoreError;

use crate::state::AppState;

mod accept_fight;
mod forfeit_fight;
mod join_queue;
mod leaderboard;
mod leave_queue;
mod list_fights;
mod match_kinds;
mod place_wager;
mod register_fighter;
mod report_damage;

/// Build the User API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fighters", post(register_fighter::register_fighter))
        .route("/match-kinds", get(match_kinds::list_match_kinds))
        .route("/queue/join", post(join_queue::join_queue))
        .route("/queue/leave", post(leave_queue::leave_queue))
        .route("/fights", get(list_fights::list_fights))
        .route("/fights/{fight_id}/accept", post(accept_fight::accept_fight))
        .route(
            "/fights/{fight_id}/forfeit",
            post(forfeit_fight::forfeit_fight),
        )
        .route(
            "/fights/{fight_id}/damage",
            post(report_damage::report_damage),
        )
        .route("/fights/{fight_id}/wagers", post(place_wager::place_wager))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in User API handlers.
#[derive(Debug)]
pub(crate) enum UserApiError {
    Queue(QueueError),
    Wager(WagerError),
    Store(StoreError),
    /// The fight refused the request: wrong fighter, wrong state, or
    /// no such fight.
    Refused,
    /// A processor channel is gone; the server is shutting down or
    /// misassembled.
    ChannelClosed,
}

impl From<StoreError> for UserApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            UserApiError::Queue(err) => {
                let status = match &err {
                    QueueError::UnknownMatchKind => StatusCode::BAD_REQUEST,
                    QueueError::UnknownFighter | QueueError::NotQueued => StatusCode::NOT_FOUND,
                    QueueError::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
                    QueueError::Store(_) => {
                        tracing::error!(error = %err, "User API store error");
                        return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                            .into_response();
                    }
                };
                (status, err.to_string()).into_response()
            }
            UserApiError::Wager(err) => {
                let status = match &err {
                    WagerError::InvalidAmount { .. } | WagerError::InvalidSide => {
                        StatusCode::BAD_REQUEST
                    }
                    WagerError::DuplicateWager | WagerError::NotBettable => StatusCode::CONFLICT,
                    WagerError::ParticipantBet => StatusCode::FORBIDDEN,
                    WagerError::UnknownBettor => StatusCode::NOT_FOUND,
                    WagerError::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
                    WagerError::Store(_) => {
                        tracing::error!(error = %err, "User API store error");
                        return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                            .into_response();
                    }
                };
                (status, err.to_string()).into_response()
            }
            UserApiError::Store(err) => {
                tracing::error!(error = %err, "User API store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            UserApiError::Refused => {
                (StatusCode::CONFLICT, "request refused for this fight").into_response()
            }
            UserApiError::ChannelClosed => {
                tracing::error!("User API: processor channel closed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
