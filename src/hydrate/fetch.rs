// src/hydrate/fetch.rs
// =============================================================================
// This module downloads file contents from their raw download URLs.
//
// Key functionality:
// - One GET per file, read as text
// - Up to `concurrency` downloads in flight at once
// - Results come back in the same order as the requests
// - A failing file never fails the batch; it is reported as success: false
// =============================================================================

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::github::FileRecord;

pub const NO_DOWNLOAD_URL: &str = "No download URL available";
pub const FETCH_FAILED: &str = "Failed to fetch content";

/// One file to hydrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub path: String,
    #[serde(default, alias = "downloadUrl")]
    pub download_url: Option<String>,
}

impl From<&FileRecord> for ContentRequest {
    fn from(record: &FileRecord) -> Self {
        ContentRequest {
            path: record.path.clone(),
            download_url: record.download_url.clone(),
        }
    }
}

/// Outcome for one file: `{path, content, success: true}` or `{path, error, success: false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResult {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

impl ContentResult {
    pub fn fetched(path: String, content: String) -> Self {
        ContentResult {
            path,
            content: Some(content),
            error: None,
            success: true,
        }
    }

    pub fn failed(path: String, error: impl Into<String>) -> Self {
        ContentResult {
            path,
            content: None,
            error: Some(error.into()),
            success: false,
        }
    }
}

// Fetches every request's download URL, keeping at most `concurrency`
// requests in flight.
//
// .buffered() (not .buffer_unordered()) so results stay in input order
pub async fn fetch_contents(
    client: &Client,
    files: Vec<ContentRequest>,
    concurrency: usize,
) -> Vec<ContentResult> {
    stream::iter(files)
        .map(|file| fetch_one(client, file))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

async fn fetch_one(client: &Client, file: ContentRequest) -> ContentResult {
    // No URL means nothing to fetch; no network call is made
    let Some(url) = file.download_url.as_deref() else {
        return ContentResult::failed(file.path, NO_DOWNLOAD_URL);
    };

    match fetch_text(client, url).await {
        Ok(content) => ContentResult::fetched(file.path, content),
        Err(e) => {
            warn!(path = %file.path, error = %e, "failed to fetch file content");
            ContentResult::failed(file.path, FETCH_FAILED)
        }
    }
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.error_for_status()?.text().await
}
