//! Custom Axum extractors for request authentication.
//!
//! Provides `AdminAuth`, which checks the `Authorization: Bearer`
//! header against the configured admin secret.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// An Axum extractor that authorizes admin requests.
///
/// # Header format
///
/// ```text
/// Authorization: Bearer {admin_secret}
/// ```
pub struct AdminAuth;

/// Errors returned by the [`AdminAuth`] extractor.
#[derive(Debug)]
pub enum AdminAuthError {
    Disabled,
    MissingHeader,
    InvalidHeader,
    WrongSecret,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminAuthError::Disabled => (StatusCode::NOT_FOUND, "admin API disabled"),
            AdminAuthError::MissingHeader => {
                (StatusCode::UNAUTHORIZED, "missing Authorization header")
            }
            AdminAuthError::InvalidHeader => {
                (StatusCode::BAD_REQUEST, "invalid Authorization header")
            }
            AdminAuthError::WrongSecret => (StatusCode::UNAUTHORIZED, "wrong admin secret"),
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.admin_secret.is_empty() {
            return Err(AdminAuthError::Disabled);
        }

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidHeader)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AdminAuthError::InvalidHeader)?;

        if token != state.admin_secret.as_ref() {
            return Err(AdminAuthError::WrongSecret);
        }

        Ok(AdminAuth)
    }
}
