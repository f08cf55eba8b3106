// src/testing.rs
// =============================================================================
// Test helpers: a fake GitHub API served by axum on an ephemeral local port.
//
// It implements just enough of GitHub for our code:
//   GET /user                               token check (keyed on the token)
//   GET /repos/{o}/{r}/contents[/{*path}]   listings built from an in-memory file set
//   GET /raw/{*path}                        raw file bytes (the download_url target)
//
// Tokens understood by GET /user:
//   "good" -> 200, "expired" -> 401, "scoped" -> 403, anything else -> 500
// =============================================================================

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// In-memory repository contents for the fake API.
#[derive(Default, Clone)]
pub struct FakeRepo {
    files: Vec<(String, Vec<u8>)>,
    empty_dirs: Vec<String>,
    failing_dirs: HashSet<String>,
    unreachable: HashSet<String>,
    without_url: HashSet<String>,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(self, path: &str, text: &str) -> Self {
        self.binary(path, text.as_bytes())
    }

    pub fn binary(mut self, path: &str, bytes: &[u8]) -> Self {
        self.files.push((path.to_string(), bytes.to_vec()));
        self
    }

    pub fn empty_dir(mut self, path: &str) -> Self {
        self.empty_dirs.push(path.to_string());
        self
    }

    /// Listing this directory answers 500
    pub fn failing_dir(mut self, path: &str) -> Self {
        self.failing_dirs.insert(path.to_string());
        self
    }

    /// The raw URL of this file answers 404
    pub fn unreachable(mut self, path: &str) -> Self {
        self.unreachable.insert(path.to_string());
        self
    }

    /// This file is listed with `download_url: null`
    pub fn without_url(mut self, path: &str) -> Self {
        self.without_url.insert(path.to_string());
        self
    }
}

pub struct FakeState {
    repo: FakeRepo,
    base_url: String,
    listing_calls: AtomicUsize,
    raw_calls: AtomicUsize,
}

pub struct FakeGitHub {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeGitHub {
    pub fn listing_calls(&self) -> usize {
        self.state.listing_calls.load(Ordering::SeqCst)
    }

    pub fn raw_calls(&self) -> usize {
        self.state.raw_calls.load(Ordering::SeqCst)
    }

    pub fn raw_url(&self, path: &str) -> String {
        format!("{}/raw/{}", self.base_url, path)
    }
}

/// Serves `router` on 127.0.0.1 with a random port and returns the base URL.
pub async fn spawn_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn spawn_fake_github(repo: FakeRepo) -> FakeGitHub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let state = Arc::new(FakeState {
        repo,
        base_url: base_url.clone(),
        listing_calls: AtomicUsize::new(0),
        raw_calls: AtomicUsize::new(0),
    });

    let router = Router::new()
        .route("/user", get(user))
        .route("/repos/{owner}/{repo}/contents", get(root_listing))
        .route("/repos/{owner}/{repo}/contents/{*path}", get(nested_listing))
        .route("/raw/{*path}", get(raw))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    FakeGitHub { base_url, state }
}

async fn user(headers: HeaderMap) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("");

    match token {
        "good" => Json(json!({ "login": "octocat" })).into_response(),
        "expired" => message(StatusCode::UNAUTHORIZED, "Bad credentials"),
        "scoped" => message(StatusCode::FORBIDDEN, "Resource not accessible by integration"),
        _ => message(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
    }
}

async fn root_listing(State(state): State<Arc<FakeState>>) -> Response {
    listing(&state, "")
}

async fn nested_listing(
    State(state): State<Arc<FakeState>>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
) -> Response {
    listing(&state, path.trim_matches('/'))
}

async fn raw(State(state): State<Arc<FakeState>>, Path(path): Path<String>) -> Response {
    state.raw_calls.fetch_add(1, Ordering::SeqCst);
    let repo = &state.repo;
    if repo.unreachable.contains(&path) {
        return message(StatusCode::NOT_FOUND, "Not Found");
    }
    match repo.files.iter().find(|(p, _)| *p == path) {
        Some((_, bytes)) => bytes.clone().into_response(),
        None => message(StatusCode::NOT_FOUND, "Not Found"),
    }
}

fn listing(state: &FakeState, dir: &str) -> Response {
    state.listing_calls.fetch_add(1, Ordering::SeqCst);
    let repo = &state.repo;

    if repo.failing_dirs.contains(dir) {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Server Error");
    }

    // A path that names a file gets a single object with an inline body
    if let Some((path, bytes)) = repo.files.iter().find(|(p, _)| p == dir) {
        let mut entry = file_entry(state, path, bytes.len());
        entry["content"] = json!(STANDARD.encode(bytes));
        entry["encoding"] = json!("base64");
        return Json(entry).into_response();
    }

    let prefix = if dir.is_empty() { String::new() } else { format!("{dir}/") };
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    let all_paths = repo
        .files
        .iter()
        .map(|(p, b)| (p.as_str(), Some(b.len())))
        .chain(repo.empty_dirs.iter().map(|p| (p.as_str(), None)));

    for (path, size) in all_paths {
        let Some(rest) = path.strip_prefix(&prefix) else { continue };
        if rest.is_empty() {
            continue;
        }
        let (name, is_dir) = match rest.split_once('/') {
            Some((first, _)) => (first, true),
            None => (rest, size.is_none()),
        };
        let child = format!("{prefix}{name}");
        if !seen.insert(child.clone()) {
            continue;
        }
        if is_dir {
            entries.push(json!({
                "name": name,
                "path": child,
                "type": "dir",
                "size": 0,
                "sha": format!("sha-{child}"),
                "download_url": null,
            }));
        } else {
            entries.push(file_entry(state, &child, size.unwrap_or(0)));
        }
    }

    let is_known_dir = dir.is_empty() || repo.empty_dirs.iter().any(|d| d == dir);
    if entries.is_empty() && !is_known_dir {
        return message(StatusCode::NOT_FOUND, "Not Found");
    }

    Json(Value::Array(entries)).into_response()
}

fn file_entry(state: &FakeState, path: &str, size: usize) -> Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    let download_url = if state.repo.without_url.contains(path) {
        Value::Null
    } else {
        json!(format!("{}/raw/{}", state.base_url, path))
    };
    json!({
        "name": name,
        "path": path,
        "type": "file",
        "size": size,
        "sha": format!("sha-{path}"),
        "download_url": download_url,
    })
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}
