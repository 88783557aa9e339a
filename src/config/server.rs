use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_OAUTH_BASE: &str = "https://github.com";

/// OAuth application and API endpoints for the hosting service.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the callback registered with the OAuth app.
    pub callback_url: String,
    pub api_base: String,
    pub oauth_base: String,
    /// Branch the contents endpoint writes uploads to.
    pub upload_branch: String,
}

impl GitHubConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: "http://localhost:4000/auth/github/callback".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            oauth_base: DEFAULT_OAUTH_BASE.to_string(),
            upload_branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin of the browser client. Used for CORS and post-login redirects.
    pub frontend_url: String,
    pub github: GitHubConfig,
    pub session_ttl: Duration,
    /// Fixed destination for `git clone`.
    pub clone_dir: PathBuf,
    pub clone_timeout: Duration,
    pub git_binary: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Session cookies are only marked `Secure` when the callback is served over https.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.github.callback_url.starts_with("https://")
    }

    #[must_use]
    pub fn frontend_route(&self, path: &str) -> String {
        format!("{}{}", self.frontend_url.trim_end_matches('/'), path)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            frontend_url: "http://localhost:3000".to_string(),
            github: GitHubConfig::default(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            clone_dir: default_clone_dir(),
            clone_timeout: Duration::from_secs(300),
            git_binary: "git".to_string(),
        }
    }
}

/// Platform-dependent default clone target under the user's desktop.
#[must_use]
pub fn default_clone_dir() -> PathBuf {
    if cfg!(windows) {
        let profile = std::env::var_os("USERPROFILE").unwrap_or_default();
        PathBuf::from(profile)
            .join("Desktop")
            .join("Cloned-Repositories")
    } else {
        let home = std::env::var_os("HOME").unwrap_or_default();
        PathBuf::from(home).join("Desktop").join("ClonedRepos")
    }
}
