use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use crate::config::GitHubConfig;
use crate::error::{Error, Result};
use crate::github::RepositoryGateway;
use crate::store::SessionStore;
use crate::types::{AccessToken, Principal, Session};

/// Scopes requested from the identity provider.
pub const OAUTH_SCOPES: &[&str] = &["repo", "user"];

const STATE_LENGTH: usize = 32;
const STATE_TTL_MINUTES: i64 = 10;
const MAX_PENDING_STATES: usize = 1024;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Drives the OAuth authorization-code flow and turns a successful handshake
/// into a session.
pub struct AuthenticationBroker {
    config: GitHubConfig,
    gateway: RepositoryGateway,
    sessions: Arc<dyn SessionStore>,
    pending_states: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AuthenticationBroker {
    #[must_use]
    pub fn new(
        config: GitHubConfig,
        gateway: RepositoryGateway,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            gateway,
            sessions,
            pending_states: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the identity provider URL to redirect the browser to. Nothing
    /// is stored apart from the anti-forgery `state` value.
    pub fn begin_authorization(&self) -> Result<String> {
        if !self.config.is_configured() {
            return Err(Error::Config("GitHub OAuth client is not configured".into()));
        }

        let state = self.remember_state();
        let scope = OAUTH_SCOPES.join(" ");
        let base = format!(
            "{}/login/oauth/authorize",
            self.config.oauth_base.trim_end_matches('/')
        );
        let url = Url::parse_with_params(
            &base,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("scope", scope.as_str()),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid oauth base url: {e}")))?;

        Ok(url.into())
    }

    /// Exchanges an authorization code and stores a new session. On any
    /// failure no session is created.
    pub async fn complete_authorization(&self, code: &str, state: &str) -> Result<Session> {
        if !self.take_state(state) {
            return Err(Error::Unauthorized);
        }

        let token = self.exchange_code(code).await?;
        let profile = self.gateway.authenticated_user(&token).await?;

        tracing::info!(user = %profile.username, "OAuth handshake completed");

        self.sessions.create(Principal {
            profile,
            access_token: token,
        })
    }

    /// Removes the session if there is one. Safe to call repeatedly.
    pub fn logout(&self, session_id: Option<&str>) -> Result<()> {
        if let Some(id) = session_id {
            if self.sessions.delete(id)? {
                tracing::debug!("Session removed on logout");
            }
        }
        Ok(())
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        let url = format!(
            "{}/login/oauth/access_token",
            self.config.oauth_base.trim_end_matches('/')
        );
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.callback_url.as_str()),
        ];

        let response = self
            .gateway
            .http()
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream(
                Some(status.as_u16()),
                format!("token exchange returned {status}"),
            ));
        }

        let body: TokenResponse = response.json().await?;
        match (body.access_token, body.error) {
            (Some(token), None) if !token.is_empty() => Ok(AccessToken::new(token)),
            (_, error) => Err(Error::upstream(
                Some(status.as_u16()),
                body.error_description
                    .or(error)
                    .unwrap_or_else(|| "token exchange returned no access token".into()),
            )),
        }
    }

    fn remember_state(&self) -> String {
        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(STATE_LENGTH)
            .map(char::from)
            .collect();

        let now = Utc::now();
        let mut pending = self
            .pending_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.retain(|_, expires_at| *expires_at > now);
        while pending.len() >= MAX_PENDING_STATES {
            let oldest = pending
                .iter()
                .min_by_key(|(_, expires_at)| **expires_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => pending.remove(&key),
                None => break,
            };
        }
        pending.insert(state.clone(), now + Duration::minutes(STATE_TTL_MINUTES));
        state
    }

    /// Consumes a state value. Each value is accepted at most once.
    fn take_state(&self, state: &str) -> bool {
        let mut pending = self
            .pending_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        matches!(pending.remove(state), Some(expires_at) if expires_at > Utc::now())
    }
}
