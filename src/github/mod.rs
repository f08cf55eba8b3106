// src/github/mod.rs
// =============================================================================
// This module talks to GitHub.
//
// It implements:
// - Parsing GitHub URLs into owner / repo / branch / subpath
// - A small REST client for the contents API, authenticated per request
// - Token validation against GET /user
// - The FileRecord type every other module works with
// =============================================================================

mod client;
mod repo_url;
mod token;
mod types;

pub use client::{GitHubClient, GitHubError};
pub use repo_url::{parse_source_url, RepoLocation};
pub use token::validate_token;
pub use types::{ContentEntry, EntryKind, FileRecord, FileType};
