use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::{clone, repos, session};
use crate::auth::AuthenticationBroker;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::git::LocalCloneExecutor;
use crate::github::RepositoryGateway;
use crate::store::{MemorySessionStore, SessionStore};

const CSP_DIRECTIVES: &str = "default-src *; font-src * data:;";
const MAX_UPLOAD_BODY: usize = 25 * 1024 * 1024;

pub struct AppState {
    pub config: ServerConfig,
    pub sessions: Arc<dyn SessionStore>,
    pub broker: AuthenticationBroker,
    pub gateway: RepositoryGateway,
    pub cloner: LocalCloneExecutor,
}

impl AppState {
    /// Wires the default in-memory session store.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let sessions = Arc::new(MemorySessionStore::new(config.session_ttl)?);
        Self::with_sessions(config, sessions)
    }

    pub fn with_sessions(config: ServerConfig, sessions: Arc<dyn SessionStore>) -> Result<Self> {
        let gateway = RepositoryGateway::new(&config.github)?;
        let broker =
            AuthenticationBroker::new(config.github.clone(), gateway.clone(), sessions.clone());
        let cloner = LocalCloneExecutor::from_config(&config);

        Ok(Self {
            config,
            sessions,
            broker,
            gateway,
            cloner,
        })
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

async fn content_security_policy(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP_DIRECTIVES),
    );
    response
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(config.frontend_url.trim_end_matches('/')) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!("Ignoring invalid frontend origin for CORS: {e}");
            layer
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(session::root))
        .route("/health", get(health))
        .route("/auth/github", get(session::begin_authorization))
        .route("/auth/github/callback", get(session::complete_authorization))
        .route("/user", get(session::current_user))
        .route("/logout", get(session::logout))
        .route("/repos/{username}", get(repos::list_repositories))
        .route("/create-repo", post(repos::create_repository))
        .route(
            "/upload-files",
            post(repos::upload_files).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY)),
        )
        .route("/clone", post(clone::clone_repository))
        .layer(middleware::from_fn(content_security_policy))
        .layer(cors)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
