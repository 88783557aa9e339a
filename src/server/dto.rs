use serde::{Deserialize, Serialize};

use crate::types::{FailedUpload, Profile};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Only the profile is returned; the access token stays on the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub profile: Profile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepoRequest {
    #[serde(default)]
    pub repo_name: String,
    #[serde(default)]
    pub is_private: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepoResponse {
    pub message: &'static str,
    pub repo_url: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub committed: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadFailureResponse {
    pub error: String,
    pub committed: Vec<String>,
    pub failed: FailedUpload,
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CloneResponse {
    pub message: &'static str,
    pub output: String,
}
