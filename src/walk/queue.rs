// src/walk/queue.rs
// =============================================================================
// This module walks a GitHub directory tree with an explicit work stack.
//
// How it works:
// 1. List the starting path and push its entries as one stack frame
// 2. Take the next entry from the top frame
// 3. A file becomes a FileRecord right away
// 4. A directory is listed and its entries are pushed as a new frame, so they
//    are handled before the rest of the parent's entries
// 5. Pop frames as they run empty, until the stack is empty
//
// The result is the same pre-order as a recursive walk, without recursion.
//
// Failure policy:
// - A listing that fails (root or subtree) is logged and remembered
// - That subtree contributes zero files; the walk keeps going
// =============================================================================

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::github::{ContentEntry, EntryKind, FileRecord, GitHubClient, RepoLocation};

/// Everything a walk produced.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Files in traversal order
    pub files: Vec<FileRecord>,
    /// Paths whose listing failed, with the reason
    pub failed_paths: Vec<(String, String)>,
    /// Number of listing calls made
    pub listings: usize,
}

// Walks everything under `location.path` on `location.branch`.
//
// Never fails as a whole: see the failure policy above.
pub async fn walk_tree(client: &GitHubClient, location: &RepoLocation) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();

    // Each frame holds the not-yet-processed entries of one directory
    let mut stack: Vec<VecDeque<ContentEntry>> = Vec::new();

    if let Some(entries) = list(client, location, &location.path, &mut outcome).await {
        stack.push(entries.into());
    }

    loop {
        let entry = match stack.last_mut() {
            None => break,
            Some(frame) => match frame.pop_front() {
                Some(entry) => entry,
                None => {
                    stack.pop();
                    continue;
                }
            },
        };

        match entry.kind {
            EntryKind::File => outcome.files.push(FileRecord::from_entry(entry)),
            EntryKind::Dir => {
                if let Some(children) = list(client, location, &entry.path, &mut outcome).await {
                    stack.push(children.into());
                }
            }
            other => debug!(path = %entry.path, kind = ?other, "skipping non-file entry"),
        }
    }

    info!(
        owner = %location.owner,
        repo = %location.repo,
        files = outcome.files.len(),
        listings = outcome.listings,
        failed = outcome.failed_paths.len(),
        "walk finished"
    );

    outcome
}

// One listing call; failures are recorded on the outcome and return None
async fn list(
    client: &GitHubClient,
    location: &RepoLocation,
    path: &str,
    outcome: &mut WalkOutcome,
) -> Option<Vec<ContentEntry>> {
    outcome.listings += 1;

    match client
        .list_contents(&location.owner, &location.repo, path, &location.branch)
        .await
    {
        Ok(entries) => Some(entries),
        Err(e) => {
            let shown = if path.is_empty() { "/" } else { path };
            warn!(path = %shown, error = %e, "failed to list directory, skipping it");
            outcome.failed_paths.push((shown.to_string(), e.to_string()));
            None
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a stack instead of recursion?
//    - An async fn can't call itself without boxing the future
//    - A Vec used as a stack has no depth limit besides memory
//    - It also leaves room to fetch sibling directories concurrently later
//
// 2. Why VecDeque for each frame?
//    - We take entries from the front to keep GitHub's listing order
//    - pop_front() on a VecDeque is O(1), on a Vec it would be O(n)
//
// 3. What is stack.last_mut()?
//    - A mutable reference to the top frame (or None if the stack is empty)
//    - We finish using it before awaiting the next listing, so the borrow
//      checker lets us push a new frame afterwards
// -----------------------------------------------------------------------------
