use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::Error;

/// API error that converts to a `{"error": ...}` JSON response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".into(),
        }
    }

    #[must_use]
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Extension trait for turning crate errors into API errors. The remote
/// service's own message is passed through when it sent one; every other
/// failure is logged and replaced by `fallback`.
pub trait ResultExt<T> {
    fn api_err(self, fallback: &'static str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for Result<T, Error> {
    fn api_err(self, fallback: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| match e {
            Error::Unauthorized => ApiError::unauthorized(),
            Error::Validation(message) => ApiError::bad_request(message),
            Error::Upstream {
                status: Some(status),
                message,
            } => {
                tracing::warn!(status, "Upstream rejected request: {message}");
                ApiError::internal(message)
            }
            other => {
                tracing::warn!("{fallback}: {other}");
                ApiError::internal(fallback)
            }
        })
    }
}

/// A `302 Found` redirect, optionally setting a cookie.
pub fn found(location: &str, set_cookie: Option<HeaderValue>) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(e) => {
            tracing::error!("Invalid redirect location {location:?}: {e}");
            return ApiError::internal("Internal server error").into_response();
        }
    }
    if let Some(cookie) = set_cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}
