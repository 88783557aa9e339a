use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::RequireSession;
use crate::server::AppState;
use crate::server::dto::{
    CreateRepoRequest, CreateRepoResponse, UploadFailureResponse, UploadResponse,
};
use crate::server::response::{ApiError, ResultExt};
use crate::server::validation::{validate_repo_name, validate_upload_path};
use crate::types::{FileUploadItem, RepositoryDescriptor};

/// GET /repos/{username} - Public repositories of any user
pub async fn list_repositories(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<RepositoryDescriptor>>, ApiError> {
    let repos = state
        .gateway
        .list_repositories(&username)
        .await
        .map_err(|e| {
            tracing::warn!(%username, "Failed to fetch repositories: {e}");
            ApiError::internal("Failed to fetch repositories")
        })?;

    Ok(Json(repos))
}

/// POST /create-repo - Create a repository owned by the signed-in user
pub async fn create_repository(
    RequireSession(session): RequireSession,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRepoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.repo_name.trim();
    validate_repo_name(name)?;

    let repo_url = state
        .gateway
        .create_repository(&session.principal, name, req.is_private.unwrap_or(false))
        .await
        .api_err("Failed to create repository")?;

    Ok(Json(CreateRepoResponse {
        message: "Repository created successfully!",
        repo_url,
    }))
}

/// POST /upload-files - Commit uploaded files into one of the user's repositories
pub async fn upload_files(
    RequireSession(session): RequireSession,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let (repo_name, files) = parse_upload(&mut multipart).await?;

    let repo_name = repo_name.unwrap_or_default();
    validate_repo_name(repo_name.trim())?;

    tracing::info!(
        user = %session.principal.profile.username,
        repo = %repo_name.trim(),
        files = files.len(),
        "Uploading files"
    );

    let report = state
        .gateway
        .commit_files(&session.principal, repo_name.trim(), files)
        .await;

    let response = match report.failed {
        None => Json(UploadResponse {
            message: "Files uploaded successfully!",
            committed: report.committed,
        })
        .into_response(),
        Some(failed) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(UploadFailureResponse {
                error: failed.error.clone(),
                committed: report.committed,
                failed,
                skipped: report.skipped,
            }),
        )
            .into_response(),
    };

    Ok(response)
}

const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

async fn parse_upload(
    multipart: &mut Multipart,
) -> Result<(Option<String>, Vec<FileUploadItem>), ApiError> {
    let mut repo_name = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart: {e}")))?
    {
        match field.name() {
            Some("repoName") => {
                repo_name = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read repoName: {e}"))
                })?);
            }
            Some("files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                validate_upload_path(&filename)?;

                let data = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read file {filename}: {e}"))
                })?;
                if data.len() > MAX_FILE_SIZE {
                    return Err(ApiError::payload_too_large(format!(
                        "File {filename} ({} bytes) exceeds maximum allowed size ({MAX_FILE_SIZE} bytes)",
                        data.len()
                    )));
                }

                files.push(FileUploadItem {
                    filename,
                    content: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok((repo_name, files))
}
