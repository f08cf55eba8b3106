// src/walk/mod.rs
// =============================================================================
// This module turns a GitHub directory into a flat list of files.
//
// Features:
// - Depth-first walk with an explicit work stack (queue.rs)
// - Segment-aware stripping of the base path for subdirectory walks (paths.rs)
// - A hierarchical view of the result for display (tree.rs)
//
// fetch_directory() below is the pipeline both the HTTP handler and the
// download command run after the token has been validated.
// =============================================================================

mod paths;
mod queue;
mod tree;

use paths::normalize_paths;
use queue::walk_tree;
pub use tree::{build_tree, format_file_size, render_tree, FileNode};

use crate::error::AppError;
use crate::github::{FileRecord, GitHubClient, RepoLocation};

pub const NO_FILES_FOUND: &str = "No files found in specified directory";

/// Result of walking and normalizing one directory.
#[derive(Debug)]
pub struct DirectoryListing {
    pub files: Vec<FileRecord>,
    /// The subtree path the walk started from ("" for the root)
    pub base_path: String,
    /// One line per directory that could not be listed
    pub warnings: Vec<String>,
}

// Walks `location`, strips the base path, and reports an empty result as
// NotFound rather than as an empty success.
pub async fn fetch_directory(
    client: &GitHubClient,
    location: &RepoLocation,
) -> Result<DirectoryListing, AppError> {
    let outcome = walk_tree(client, location).await;

    if outcome.files.is_empty() {
        return Err(AppError::NotFound(NO_FILES_FOUND.into()));
    }

    let mut files = outcome.files;
    if !location.is_root() {
        normalize_paths(&mut files, &location.path);
    }

    let warnings = outcome
        .failed_paths
        .into_iter()
        .map(|(path, reason)| format!("failed to list {path}: {reason}"))
        .collect();

    Ok(DirectoryListing {
        files,
        base_path: location.path.clone(),
        warnings,
    })
}
