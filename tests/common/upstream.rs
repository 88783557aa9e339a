use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::{Value, json};

pub const TEST_TOKEN: &str = "gho_stubbed_token";
pub const GOOD_CODE: &str = "good-code";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct StubState {
    requests: Mutex<Vec<RecordedRequest>>,
    failing_paths: Mutex<HashSet<String>>,
}

impl StubState {
    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            authorization,
            body,
        });
    }
}

/// A stand-in for the GitHub web and API hosts, bound to a random local port.
pub struct StubUpstream {
    pub base_url: String,
    state: Arc<StubState>,
}

pub fn sample_repo() -> Value {
    json!({
        "id": 1296269,
        "name": "hello-world",
        "full_name": "octocat/hello-world",
        "description": "My first repository on GitHub!",
        "clone_url": "https://github.com/octocat/hello-world.git",
        "html_url": "https://github.com/octocat/hello-world",
        "private": false,
        "visibility": "public",
        "default_branch": "main",
        "owner": { "login": "octocat" }
    })
}

impl StubUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());

        let app = Router::new()
            .route("/login/oauth/access_token", post(access_token))
            .route("/user", get(user))
            .route("/user/repos", post(create_repo))
            .route("/users/{username}/repos", get(list_repos))
            .route("/repos/{owner}/{repo}/contents/{*path}", put(put_contents))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub upstream");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Makes every contents write for `path` fail with a 409.
    pub fn fail_contents_path(&self, path: &str) {
        self.state
            .failing_paths
            .lock()
            .unwrap()
            .insert(path.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }
}

async fn access_token(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, json!(form));

    if form.get("code").map(String::as_str) == Some(GOOD_CODE) {
        Json(json!({ "access_token": TEST_TOKEN, "token_type": "bearer", "scope": "repo,user" }))
    } else {
        Json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        }))
    }
}

async fn user(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);

    let expected = format!("token {TEST_TOKEN}");
    if headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Bad credentials" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": 583231,
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "html_url": "https://github.com/octocat"
        })),
    )
}

async fn list_repos(
    State(state): State<Arc<StubState>>,
    Path(username): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, Value::Null);

    match username.as_str() {
        "octocat" => (StatusCode::OK, Json(json!([sample_repo()]))),
        "empty" => (StatusCode::OK, Json(json!([]))),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))),
    }
}

async fn create_repo(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, body.clone());

    let name = body["name"].as_str().unwrap_or_default();
    if name == "taken" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Repository creation failed." })),
        );
    }

    (
        StatusCode::CREATED,
        Json(json!({ "html_url": format!("https://github.com/octocat/{name}") })),
    )
}

async fn put_contents(
    State(state): State<Arc<StubState>>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, body);

    if state.failing_paths.lock().unwrap().contains(&path) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": format!("{path} does not match") })),
        );
    }

    (StatusCode::CREATED, Json(json!({ "content": { "path": path } })))
}
