use std::sync::Arc;

use axum::{Json, extract::State};

use crate::server::AppState;
use crate::server::dto::CloneResponse;
use crate::server::response::{ApiError, ResultExt};
use crate::types::CloneRequest;

/// POST /clone - Clone a public repository into the fixed local directory
pub async fn clone_repository(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CloneRequest>,
) -> Result<Json<CloneResponse>, ApiError> {
    let output = state.cloner.clone(&req).await.api_err("Git clone failed.")?;

    Ok(Json(CloneResponse {
        message: "Repository cloned successfully!",
        output,
    }))
}
