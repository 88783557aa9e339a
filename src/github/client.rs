use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::dto::{CreateRepoBody, CreatedRepo, GitHubErrorBody, GitHubUser, PutContentsBody};
use crate::config::GitHubConfig;
use crate::error::{Error, Result};
use crate::types::{
    AccessToken, CommitReport, FailedUpload, FileUploadItem, Principal, Profile,
    RepositoryDescriptor,
};

pub const REPO_DESCRIPTION: &str = "Repository created via GitHub Cloner App";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the hosting API operations a session may perform.
#[derive(Clone)]
pub struct RepositoryGateway {
    http: reqwest::Client,
    api_base: String,
    upload_branch: String,
}

impl RepositoryGateway {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("repo-relay/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_branch: config.upload_branch.clone(),
        })
    }

    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Lists the public repositories of any user. No credential is sent.
    pub async fn list_repositories(&self, username: &str) -> Result<Vec<RepositoryDescriptor>> {
        let url = format!(
            "{}/users/{}/repos",
            self.api_base,
            urlencoding::encode(username)
        );
        send_json(self.http.get(&url)).await
    }

    /// Resolves the profile the token was issued for.
    pub async fn authenticated_user(&self, token: &AccessToken) -> Result<Profile> {
        let url = format!("{}/user", self.api_base);
        let user: GitHubUser = send_json(authorized(self.http.get(&url), token)).await?;
        Ok(user.into())
    }

    /// Creates a repository owned by the principal and returns its web URL.
    pub async fn create_repository(
        &self,
        principal: &Principal,
        name: &str,
        is_private: bool,
    ) -> Result<String> {
        let url = format!("{}/user/repos", self.api_base);
        let body = CreateRepoBody {
            name,
            private: is_private,
            description: REPO_DESCRIPTION,
        };

        let created: CreatedRepo =
            send_json(authorized(self.http.post(&url), &principal.access_token).json(&body))
                .await?;

        tracing::info!(
            user = %principal.profile.username,
            repo = %name,
            "Created repository"
        );
        Ok(created.html_url)
    }

    /// Commits each file through the contents endpoint, one at a time and in
    /// the order given. Stops at the first failure; files already committed
    /// stay committed and the rest are reported as skipped.
    pub async fn commit_files(
        &self,
        principal: &Principal,
        repo_name: &str,
        files: Vec<FileUploadItem>,
    ) -> CommitReport {
        let mut report = CommitReport::default();
        let mut remaining = files.into_iter();

        for file in remaining.by_ref() {
            match self.put_file(principal, repo_name, &file).await {
                Ok(()) => report.committed.push(file.filename),
                Err(e) => {
                    tracing::warn!(
                        repo = %repo_name,
                        file = %file.filename,
                        "Upload aborted: {e}"
                    );
                    report.failed = Some(FailedUpload {
                        filename: file.filename,
                        error: upstream_message(&e, "Failed to upload files"),
                    });
                    break;
                }
            }
        }

        report.skipped = remaining.map(|f| f.filename).collect();
        report
    }

    async fn put_file(
        &self,
        principal: &Principal,
        repo_name: &str,
        file: &FileUploadItem,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            urlencoding::encode(&principal.profile.username),
            urlencoding::encode(repo_name),
            encode_path(&file.filename),
        );
        let body = PutContentsBody {
            message: format!("Updated {}", file.filename),
            content: STANDARD.encode(&file.content),
            branch: &self.upload_branch,
        };

        let response = authorized(self.http.put(&url), &principal.access_token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

fn authorized(request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
    request.header(AUTHORIZATION, format!("token {}", token.expose()))
}

/// Percent-encodes each segment of a repository path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = check_status(request.send().await?).await?;
    let status = response.status().as_u16();
    response
        .json()
        .await
        .map_err(|e| Error::upstream(Some(status), format!("invalid response body: {e}")))
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: GitHubErrorBody = response.json().await.unwrap_or_default();
    let message = body
        .message
        .unwrap_or_else(|| format!("upstream returned {status}"));
    Err(Error::upstream(Some(status.as_u16()), message))
}

/// The message to hand back to a client: the remote service's own text when
/// it answered, `fallback` otherwise.
#[must_use]
fn upstream_message(err: &Error, fallback: &str) -> String {
    match err {
        Error::Upstream {
            status: Some(_),
            message,
        } => message.clone(),
        _ => fallback.to_string(),
    }
}
