use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delegated OAuth access token. Deliberately neither `Serialize` nor printable.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
}

/// The authenticated identity behind a session.
#[derive(Debug, Clone)]
pub struct Principal {
    pub profile: Profile,
    pub access_token: AccessToken,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub principal: Principal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Upstream repository metadata, passed through to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub clone_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<RepositoryOwner>,
}

#[derive(Debug, Clone)]
pub struct FileUploadItem {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneRequest {
    #[serde(default)]
    pub repo_url: String,
    /// Accepted for compatibility with the client; the destination is fixed.
    #[serde(default, alias = "repoName")]
    pub target_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpload {
    pub filename: String,
    pub error: String,
}

/// Per-file outcome of a bulk commit. Files are processed in order and the
/// batch stops at the first failure, so at most one entry is `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub committed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<FailedUpload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl CommitReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("gho_secret");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
        assert_eq!(token.expose(), "gho_secret");
    }

    #[test]
    fn test_principal_debug_hides_token() {
        let principal = Principal {
            profile: Profile {
                id: 1,
                username: "octocat".into(),
                display_name: None,
                avatar_url: None,
                profile_url: None,
            },
            access_token: AccessToken::new("gho_secret"),
        };
        let debug = format!("{principal:?}");
        assert!(debug.contains("octocat"));
        assert!(!debug.contains("gho_secret"));
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = Profile {
            id: 1,
            username: "octocat".into(),
            display_name: Some("The Octocat".into()),
            avatar_url: Some("a".into()),
            profile_url: None,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1,
                "username": "octocat",
                "displayName": "The Octocat",
                "avatarUrl": "a"
            })
        );
    }

    #[test]
    fn test_clone_request_accepts_repo_name_alias() {
        let req: CloneRequest = serde_json::from_value(serde_json::json!({
            "repoUrl": "https://github.com/octocat/hello-world.git",
            "repoName": "hello-world"
        }))
        .unwrap();
        assert_eq!(req.repo_url, "https://github.com/octocat/hello-world.git");
        assert_eq!(req.target_name.as_deref(), Some("hello-world"));
    }

    #[test]
    fn test_clone_request_missing_url_defaults_to_empty() {
        let req: CloneRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.repo_url.is_empty());
    }

    #[test]
    fn test_repository_descriptor_tolerates_sparse_payload() {
        let repo: RepositoryDescriptor =
            serde_json::from_value(serde_json::json!({ "name": "hello-world" })).unwrap();
        assert_eq!(repo.name, "hello-world");
        assert!(repo.description.is_none());
        assert!(!repo.private);
    }

    #[test]
    fn test_commit_report_omits_empty_failure_fields() {
        let report = CommitReport {
            committed: vec!["a.txt".into()],
            ..CommitReport::default()
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, serde_json::json!({ "committed": ["a.txt"] }));
        assert!(report.is_success());
    }
}
