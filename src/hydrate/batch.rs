// src/hydrate/batch.rs
// =============================================================================
// Client-side hydration: fill in `content` for listed files, batch by batch.
//
// How it works:
// 1. Pick the records that still need content (text types without a body)
// 2. Split them into batches of BATCH_SIZE
// 3. Hand each batch to a BatchFetcher (one call per batch)
// 4. Write successful results back into the records
//
// Batches go through a bounded pipeline: with parallel_batches = 1 the next
// batch starts only after the previous one is applied. Results are always
// applied in batch order.
// =============================================================================

use std::pin::pin;

use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use super::fetch::{fetch_contents, ContentRequest, ContentResult};
use crate::github::FileRecord;
use crate::server::TOKEN_HEADER;

pub const BATCH_SIZE: usize = 5;

/// Something that can resolve one batch of content requests.
///
/// Must return one result per request, in request order.
pub trait BatchFetcher {
    async fn fetch_batch(&self, batch: Vec<ContentRequest>) -> Result<Vec<ContentResult>>;
}

/// Fetches batches in-process.
pub struct DirectFetcher {
    client: Client,
    concurrency: usize,
}

impl DirectFetcher {
    pub fn new(client: Client, concurrency: usize) -> Self {
        Self { client, concurrency }
    }
}

impl BatchFetcher for DirectFetcher {
    async fn fetch_batch(&self, batch: Vec<ContentRequest>) -> Result<Vec<ContentResult>> {
        Ok(fetch_contents(&self.client, batch, self.concurrency).await)
    }
}

/// Posts batches to a running server's `/api/github-content` endpoint.
pub struct RemoteFetcher {
    client: Client,
    endpoint: Url,
    token: String,
}

#[derive(Serialize)]
struct BatchBody<'a> {
    files: &'a [ContentRequest],
}

#[derive(Deserialize)]
struct BatchReply {
    files: Vec<ContentResult>,
}

impl RemoteFetcher {
    pub fn new(client: Client, server_url: &str, token: impl Into<String>) -> Result<Self> {
        let mut base = Url::parse(server_url)
            .with_context(|| format!("invalid server URL '{server_url}'"))?;
        // Keep any path prefix (a server mounted under /fetchkit/) when joining
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        let endpoint = base
            .join("api/github-content")
            .with_context(|| format!("invalid server URL '{server_url}'"))?;
        Ok(Self {
            client,
            endpoint,
            token: token.into(),
        })
    }
}

impl BatchFetcher for RemoteFetcher {
    async fn fetch_batch(&self, batch: Vec<ContentRequest>) -> Result<Vec<ContentResult>> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(TOKEN_HEADER, &self.token)
            .json(&BatchBody { files: &batch })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("content endpoint returned HTTP {}: {}", status.as_u16(), body));
        }

        Ok(response.json::<BatchReply>().await?.files)
    }
}

/// What a hydration pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HydrationReport {
    /// Records that needed content when the pass started
    pub requested: usize,
    pub hydrated: usize,
    /// Batch calls made
    pub batches: usize,
    /// (path, reason) for every record left without content
    pub failures: Vec<(String, String)>,
}

// Hydrates `records` in place. Never fails as a whole: a failed file (or a
// failed batch) is listed in the report and the record is left untouched.
pub async fn hydrate<F: BatchFetcher>(
    fetcher: &F,
    records: &mut [FileRecord],
    batch_size: usize,
    parallel_batches: usize,
) -> HydrationReport {
    let pending: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.needs_hydration())
        .map(|(index, _)| index)
        .collect();

    let mut report = HydrationReport {
        requested: pending.len(),
        ..HydrationReport::default()
    };

    // Requests are built up front so the stream below never borrows `records`
    let batches: Vec<(Vec<usize>, Vec<ContentRequest>)> = pending
        .chunks(batch_size.max(1))
        .map(|indices| {
            let requests = indices.iter().map(|&i| ContentRequest::from(&records[i])).collect();
            (indices.to_vec(), requests)
        })
        .collect();
    report.batches = batches.len();

    let mut results = pin!(stream::iter(batches)
        .map(|(indices, requests)| async move { (indices, fetcher.fetch_batch(requests).await) })
        .buffered(parallel_batches.max(1)));

    while let Some((indices, outcome)) = results.next().await {
        match outcome {
            Ok(files) => apply_batch(records, &indices, files, &mut report),
            Err(e) => {
                warn!(error = %e, files = indices.len(), "content batch failed");
                for &i in &indices {
                    report.failures.push((records[i].path.clone(), e.to_string()));
                }
            }
        }
    }

    info!(
        requested = report.requested,
        hydrated = report.hydrated,
        failed = report.failures.len(),
        batches = report.batches,
        "hydration finished"
    );

    report
}

fn apply_batch(
    records: &mut [FileRecord],
    indices: &[usize],
    results: Vec<ContentResult>,
    report: &mut HydrationReport,
) {
    let mut results = results.into_iter();

    for &i in indices {
        let record = &mut records[i];
        match results.next() {
            Some(result) if result.path != record.path => {
                report
                    .failures
                    .push((record.path.clone(), format!("result was for '{}'", result.path)));
            }
            Some(ContentResult {
                success: true,
                content: Some(content),
                ..
            }) => {
                record.content = Some(content);
                report.hydrated += 1;
            }
            Some(result) => {
                let reason = result.error.unwrap_or_else(|| "no content returned".to_string());
                report.failures.push((record.path.clone(), reason));
            }
            None => {
                report
                    .failures
                    .push((record.path.clone(), "missing from batch response".to_string()));
            }
        }
    }
}
