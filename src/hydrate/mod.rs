// src/hydrate/mod.rs
// =============================================================================
// This module fills in file contents that the directory listing didn't
// include.
//
// Submodules:
// - fetch: server side, downloads a list of URLs with bounded concurrency
// - batch: client side, drives fixed-size batches through a BatchFetcher
// =============================================================================

mod batch;
mod fetch;

pub use batch::{hydrate, DirectFetcher, HydrationReport, RemoteFetcher, BATCH_SIZE};
pub use fetch::{fetch_contents, ContentRequest, ContentResult};
