// src/server/routes.rs
// =============================================================================
// Request handlers.
//
// Every handler checks its credential first, then validates input, then does
// the work. Failures come back as AppError and are rendered by error.rs.
// =============================================================================

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{AppState, API_KEY_HEADER, TOKEN_HEADER};
use crate::error::AppError;
use crate::export::{export_archive, todays_archive_filename};
use crate::github::{parse_source_url, validate_token, FileRecord, GitHubClient};
use crate::hydrate::{fetch_contents, ContentRequest, ContentResult};
use crate::images::{render_renditions, AspectRatio, Rendition, RenditionRequest};
use crate::walk::{build_tree, fetch_directory, FileNode};

const MISSING_URL: &str = "Missing URL parameter";
const MISSING_PARAMS: &str = "Missing required parameters";
const INVALID_API_KEY: &str = "Invalid API key";
const DIMENSIONS_REQUIRED: &str = "Width and height are required";

pub async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/github-dir
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DirQuery {
    url: Option<String>,
    tree: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DirResponse {
    success: bool,
    files: Vec<FileRecord>,
    path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<Vec<FileNode>>,
}

pub async fn github_dir(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DirQuery>,
) -> Result<Json<DirResponse>, AppError> {
    let token = require_token(&headers)?;

    let raw_url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::BadRequest(MISSING_URL.into()))?;

    // Parse before touching GitHub, so a typo costs no API quota
    let location = parse_source_url(raw_url, &state.config.default_branch)?;

    let client = GitHubClient::new(state.http.clone(), &state.config.github_api_url, token)?;
    validate_token(&client).await?;

    let listing = fetch_directory(&client, &location).await?;
    info!(
        owner = %location.owner,
        repo = %location.repo,
        path = %location.path,
        files = listing.files.len(),
        "directory listed"
    );

    let want_tree = matches!(query.tree.as_deref(), Some("true" | "1"));
    let tree = want_tree.then(|| build_tree(&listing.files));

    Ok(Json(DirResponse {
        success: true,
        files: listing.files,
        path: listing.base_path,
        warnings: listing.warnings,
        tree,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/github-content
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FilesBody<T> {
    files: Vec<T>,
}

#[derive(Serialize)]
pub struct ContentResponse {
    files: Vec<ContentResult>,
}

pub async fn github_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ContentResponse>, AppError> {
    require_token(&headers)?;
    let requests: Vec<ContentRequest> = parse_files(&body)?;

    let files = fetch_contents(&state.http, requests, state.config.content_concurrency).await;
    Ok(Json(ContentResponse { files }))
}

// ---------------------------------------------------------------------------
// POST /api/github-export
// ---------------------------------------------------------------------------

pub async fn github_export(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    require_token(&headers)?;
    let records: Vec<FileRecord> = parse_files(&body)?;
    if records.is_empty() {
        return Err(AppError::BadRequest(MISSING_PARAMS.into()));
    }

    let archive = export_archive(&state.http, &records).await?;
    let disposition = format!("attachment; filename=\"{}\"", todays_archive_filename());

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// POST /api/image-tool
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageQuery {
    aspect_ratio: Option<String>,
    width: Option<String>,
    height: Option<String>,
}

#[derive(Serialize)]
pub struct ImageResponse {
    success: bool,
    images: Vec<Rendition>,
}

pub async fn image_tool(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ImageQuery>,
    body: Bytes,
) -> Result<Json<ImageResponse>, AppError> {
    let supplied = headers.get(API_KEY_HEADER).and_then(|value| value.to_str().ok());
    match (state.config.image_api_key.as_deref(), supplied) {
        (Some(expected), Some(given)) if expected == given => {}
        _ => return Err(AppError::Unauthorized(INVALID_API_KEY.into())),
    }

    // height is required alongside width, but only width drives the output size
    let (Some(width), Some(_height)) = (
        parse_dimension(query.width.as_deref()),
        parse_dimension(query.height.as_deref()),
    ) else {
        return Err(AppError::BadRequest(DIMENSIONS_REQUIRED.into()));
    };

    let aspect: AspectRatio = query.aspect_ratio.as_deref().unwrap_or("auto").parse()?;
    let request = RenditionRequest { aspect, width };

    let images = tokio::task::spawn_blocking(move || render_renditions(&body, request))
        .await
        .map_err(|err| AppError::ImageProcessing(err.to_string()))??;

    Ok(Json(ImageResponse {
        success: true,
        images,
    }))
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn require_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::MissingCredential)
}

// Bodies are parsed by hand so that every malformed body gets the same 400
// message instead of axum's extractor rejection text
fn parse_files<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, AppError> {
    serde_json::from_slice::<FilesBody<T>>(body)
        .map(|parsed| parsed.files)
        .map_err(|_| AppError::BadRequest(MISSING_PARAMS.into()))
}

fn parse_dimension(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse::<u32>().ok().filter(|&value| value > 0)
}
