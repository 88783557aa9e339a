use std::sync::Arc;
use std::time::Duration;

use repo_relay::config::{GitHubConfig, ServerConfig};
use repo_relay::server::{AppState, create_router};
use repo_relay::store::{MemorySessionStore, SessionStore};
use repo_relay::types::{AccessToken, Principal, Profile};
use tempfile::TempDir;

use super::upstream::{StubUpstream, TEST_TOKEN};

pub const FRONTEND_URL: &str = "http://localhost:3000";

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub upstream: StubUpstream,
    pub sessions: Arc<MemorySessionStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_git("git").await
    }

    /// Starts the gateway with a specific executable standing in for `git`.
    pub async fn start_with_git(git_binary: &str) -> Self {
        let upstream = StubUpstream::start().await;
        let temp_dir = TempDir::new().expect("create temp dir");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{addr}");

        let config = ServerConfig {
            port: addr.port(),
            frontend_url: FRONTEND_URL.to_string(),
            github: GitHubConfig {
                client_id: "test-client".into(),
                client_secret: "test-secret".into(),
                callback_url: format!("{base_url}/auth/github/callback"),
                api_base: upstream.base_url.clone(),
                oauth_base: upstream.base_url.clone(),
                upload_branch: "main".into(),
            },
            clone_dir: temp_dir.path().join("Desktop").join("ClonedRepos"),
            clone_timeout: Duration::from_secs(10),
            git_binary: git_binary.to_string(),
            ..ServerConfig::default()
        };

        let sessions = Arc::new(MemorySessionStore::new(config.session_ttl).expect("store"));
        let state = Arc::new(
            AppState::with_sessions(config, sessions.clone()).expect("build app state"),
        );
        let app = create_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("build client");

        Self {
            temp_dir,
            base_url,
            upstream,
            sessions,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Plants a session for `octocat` and returns the matching `Cookie` header.
    pub fn login(&self) -> String {
        let session = self
            .sessions
            .create(Principal {
                profile: Profile {
                    id: 583231,
                    username: "octocat".into(),
                    display_name: Some("The Octocat".into()),
                    avatar_url: None,
                    profile_url: None,
                },
                access_token: AccessToken::new(TEST_TOKEN),
            })
            .expect("create session");
        format!("relay_session={}", session.id)
    }
}
