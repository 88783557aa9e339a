use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::auth::RequireSession;
use crate::auth::cookie::{
    clear_session_cookie, session_cookie, session_id_from_headers, to_header_value,
};
use crate::server::AppState;
use crate::server::dto::{CallbackParams, UserResponse};
use crate::server::response::{ApiError, ResultExt, found};

const LANDING_ROUTE: &str = "/dashboard";
const FAILURE_ROUTE: &str = "/login";

pub async fn root() -> &'static str {
    "GitHub OAuth Backend is Running!"
}

/// GET /auth/github - Redirect to the identity provider
pub async fn begin_authorization(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let url = state
        .broker
        .begin_authorization()
        .api_err("GitHub login is not available")?;
    Ok(found(&url, None))
}

/// GET /auth/github/callback - Finish the handshake and issue a session cookie
pub async fn complete_authorization(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let failure = state.config.frontend_route(FAILURE_ROUTE);

    if let Some(error) = &params.error {
        tracing::info!("Authorization declined by provider: {error}");
        return found(&failure, None);
    }
    let (Some(code), Some(oauth_state)) = (params.code.as_deref(), params.state.as_deref()) else {
        tracing::info!("Authorization callback without code or state");
        return found(&failure, None);
    };

    let session = match state.broker.complete_authorization(code, oauth_state).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Authorization failed: {e}");
            return found(&failure, None);
        }
    };

    let cookie = session_cookie(
        &session.id,
        state.config.session_ttl,
        state.config.secure_cookies(),
    );
    let Some(cookie) = to_header_value(&cookie) else {
        // The session would be unreachable without its cookie.
        if let Err(e) = state.sessions.delete(&session.id) {
            tracing::warn!("Failed to discard session: {e}");
        }
        return found(&failure, None);
    };

    found(&state.config.frontend_route(LANDING_ROUTE), Some(cookie))
}

/// GET /user - Profile of the signed-in user
pub async fn current_user(RequireSession(session): RequireSession) -> impl IntoResponse {
    Json(UserResponse {
        profile: session.principal.profile,
    })
}

/// GET /logout - Drop the session (if any) and clear the cookie
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session_id = session_id_from_headers(&headers);
    if let Err(e) = state.broker.logout(session_id.as_deref()) {
        tracing::warn!("Failed to remove session on logout: {e}");
    }

    let cookie = to_header_value(&clear_session_cookie(state.config.secure_cookies()));
    found(&state.config.frontend_route("/"), cookie)
}
