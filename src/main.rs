use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use repo_relay::config::{GitHubConfig, ServerConfig, default_clone_dir};
use repo_relay::server::{AppState, create_router};
use repo_relay::store::spawn_session_reaper;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "repo-relay")]
#[command(about = "Act on GitHub on behalf of a signed-in user", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(long, short, env = "PORT", default_value = "4000")]
    port: u16,

    /// Origin of the browser client, used for CORS and post-login redirects
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    frontend_url: String,

    /// OAuth app client id
    #[arg(long, env = "GITHUB_CLIENT_ID")]
    github_client_id: String,

    /// OAuth app client secret
    #[arg(long, env = "GITHUB_CLIENT_SECRET", hide_env_values = true)]
    github_client_secret: String,

    /// Callback URL registered with the OAuth app
    #[arg(
        long,
        env = "GITHUB_CALLBACK_URL",
        default_value = "http://localhost:4000/auth/github/callback"
    )]
    callback_url: String,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    github_api_url: String,

    /// GitHub web base URL hosting the OAuth endpoints
    #[arg(long, env = "GITHUB_OAUTH_URL", default_value = "https://github.com")]
    github_oauth_url: String,

    /// Branch that uploaded files are committed to
    #[arg(long, env = "UPLOAD_BRANCH", default_value = "main")]
    upload_branch: String,

    /// Session lifetime in seconds
    #[arg(long, env = "SESSION_TTL_SECS", default_value = "86400")]
    session_ttl_secs: u64,

    /// Directory repositories are cloned into. Defaults to a folder on the desktop.
    #[arg(long, env = "CLONE_DIR")]
    clone_dir: Option<PathBuf>,

    /// Upper bound on a single clone, in seconds
    #[arg(long, env = "CLONE_TIMEOUT_SECS", default_value = "300")]
    clone_timeout_secs: u64,

    /// git executable used for cloning
    #[arg(long, env = "GIT_BINARY", default_value = "git")]
    git_binary: String,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        ServerConfig {
            host: args.host,
            port: args.port,
            frontend_url: args.frontend_url,
            github: GitHubConfig {
                client_id: args.github_client_id,
                client_secret: args.github_client_secret,
                callback_url: args.callback_url,
                api_base: args.github_api_url,
                oauth_base: args.github_oauth_url,
                upload_branch: args.upload_branch,
            },
            session_ttl: Duration::from_secs(args.session_ttl_secs),
            clone_dir: args.clone_dir.unwrap_or_else(default_clone_dir),
            clone_timeout: Duration::from_secs(args.clone_timeout_secs),
            git_binary: args.git_binary,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("repo_relay=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let config = ServerConfig::from(args);

            if !config.github.is_configured() {
                bail!("GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET must both be set.");
            }

            let addr = config.socket_addr()?;
            info!("Cloning into {}", config.clone_dir.display());

            let state = Arc::new(AppState::new(config)?);
            let reaper = spawn_session_reaper(state.sessions.clone(), SESSION_SWEEP_INTERVAL);

            let app = create_router(state);

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
            reaper.abort();
        }
    }

    Ok(())
}
