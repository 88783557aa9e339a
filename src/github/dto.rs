use serde::{Deserialize, Serialize};

use crate::types::Profile;

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl From<GitHubUser> for Profile {
    fn from(user: GitHubUser) -> Self {
        Profile {
            id: user.id,
            username: user.login,
            display_name: user.name,
            avatar_url: user.avatar_url,
            profile_url: user.html_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateRepoBody<'a> {
    pub name: &'a str,
    pub private: bool,
    pub description: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreatedRepo {
    pub html_url: String,
}

#[derive(Debug, Serialize)]
pub struct PutContentsBody<'a> {
    pub message: String,
    pub content: String,
    pub branch: &'a str,
}

/// Error payload GitHub attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct GitHubErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
