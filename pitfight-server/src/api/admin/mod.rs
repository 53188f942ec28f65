//! Admin API handlers.
//!
//! These endpoints require the `Authorization: Bearer` header with the
//! admin secret from the config file.
//!
//! # Endpoints
//!
//! - `GET /fights`          – every fight the engine tracks
//! - `GET /queue`           – current queue tickets
//! - `GET /fighters/{id}`   – full stored fighter profile

use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::state::AppState;

mod list_fights;
mod show_fighter;
mod show_queue;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fights", get(list_fights::list_fights))
        .route("/queue", get(show_queue::show_queue))
        .route("/fighters/{fighter_id}", get(show_fighter::show_fighter))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Store(pitfight_core::store::StoreError),
    NotFound,
    ChannelClosed,
}

impl From<pitfight_core::store::StoreError> for AdminApiError {
    fn from(err: pitfight_core::store::StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::Store(err) => {
                tracing::error!(error = %err, "Admin API store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::NotFound => {
                (StatusCode::NOT_FOUND, "resource not found").into_response()
            }
            AdminApiError::ChannelClosed => {
                tracing::error!("Admin API: processor channel closed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
