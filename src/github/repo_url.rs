// src/github/repo_url.rs
// =============================================================================
// Parses GitHub source URLs into the pieces the contents API needs.
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - https://github.com/owner/repo/tree/branch
//   - https://github.com/owner/repo/tree/branch/some/sub/dir
//
// Without a `tree` segment right after owner/repo (plain repo URLs, but also
// /blob/..., /pulls, /issues/1) we use the default branch and the repo root.
// Branch names containing '/' can't be told apart from the subpath; the first
// segment after `tree` is always taken as the branch.
// =============================================================================

use serde::Serialize;
use url::Url;

use crate::error::AppError;

const INVALID_URL: &str = "Invalid GitHub URL format";

/// Where a walk starts: repository, ref and (possibly empty) subtree path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoLocation {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Slash-separated subtree path, empty for the repository root
    pub path: String,
}

impl RepoLocation {
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

// Example:
//   parse_source_url("https://github.com/rust-lang/rust/tree/master/src", "main")
//   -> owner "rust-lang", repo "rust", branch "master", path "src"
pub fn parse_source_url(raw: &str, default_branch: &str) -> Result<RepoLocation, AppError> {
    let url = Url::parse(raw.trim()).map_err(|_| AppError::BadRequest(INVALID_URL.into()))?;

    match url.host_str() {
        Some("github.com") | Some("www.github.com") => {}
        _ => return Err(AppError::BadRequest(INVALID_URL.into())),
    }

    let segments: Vec<String> = url
        .path_segments()
        .map(|parts| {
            parts
                .filter(|part| !part.is_empty())
                .map(|part| {
                    urlencoding::decode(part)
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or_else(|_| part.to_string())
                })
                .collect()
        })
        .unwrap_or_default();

    if segments.len() < 2 {
        return Err(AppError::BadRequest(INVALID_URL.into()));
    }

    let owner = segments[0].clone();
    let repo = segments[1].trim_end_matches(".git").to_string();
    if repo.is_empty() {
        return Err(AppError::BadRequest(INVALID_URL.into()));
    }

    let (branch, path) = match segments.get(2).map(String::as_str) {
        None => (default_branch.to_string(), String::new()),
        Some("tree") => {
            let branch = segments
                .get(3)
                .cloned()
                .ok_or_else(|| AppError::BadRequest(INVALID_URL.into()))?;
            (branch, segments[4..].join("/"))
        }
        // blob/, pulls, issues/N...: still this repository, walked from the root
        Some(_) => (default_branch.to_string(), String::new()),
    };

    Ok(RepoLocation {
        owner,
        repo,
        branch,
        path,
    })
}
