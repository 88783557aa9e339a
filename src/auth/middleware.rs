use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::cookie::session_id_from_headers;
use crate::server::AppState;
use crate::types::Session;

/// Extractor that requires a live session cookie.
pub struct RequireSession(pub Session);

#[derive(Debug)]
pub enum AuthError {
    MissingSession,
    UnknownSession,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingSession | AuthError::UnknownSession => {
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session_id = session_id_from_headers(&parts.headers).ok_or(AuthError::MissingSession)?;

        let session = state
            .sessions
            .resolve(&session_id)
            .map_err(|_| AuthError::InternalError)?
            .ok_or(AuthError::UnknownSession)?;

        Ok(RequireSession(session))
    }
}
