// src/github/client.rs
// =============================================================================
// A thin client for the two GitHub REST endpoints we need:
//
//   GET /user                                   (token check)
//   GET /repos/{owner}/{repo}/contents/{path}   (directory listing)
//
// The token is a field of the client, and a client is built per request.
// Nothing about the caller's credential is stored process-wide.
// =============================================================================

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::types::{ContentEntry, ContentsResponse};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request to GitHub failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid GitHub API URL: {0}")]
    Url(String),
}

impl GitHubError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
}

// GitHub error bodies look like {"message": "Bad credentials", ...}
#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: Url,
    token: String,
}

impl GitHubClient {
    /// `http` is cloned from a shared client (cheap, it's reference counted).
    pub fn new(
        http: Client,
        api_base: &str,
        token: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        let api_base = Url::parse(api_base).map_err(|err| GitHubError::Url(err.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(GitHubError::Url(format!("{api_base} cannot be a base URL")));
        }

        Ok(Self {
            http,
            api_base,
            token: token.into(),
        })
    }

    pub async fn authenticated_user(&self) -> Result<AuthenticatedUser, GitHubError> {
        let url = self.endpoint(["user"])?;
        self.get_json(url).await
    }

    /// Lists a directory (or returns a one-element list for a single file).
    pub async fn list_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<ContentEntry>, GitHubError> {
        let segments = ["repos", owner, repo, "contents"]
            .into_iter()
            .chain(path.split('/').filter(|part| !part.is_empty()));
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().append_pair("ref", reference);

        let response: ContentsResponse = self.get_json(url).await?;
        Ok(response.into_entries())
    }

    fn endpoint<'a, I>(&self, segments: I) -> Result<Url, GitHubError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::Url(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GitHubError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("unknown error").to_string();
            let message = response
                .json::<ApiMessage>()
                .await
                .map(|body| body.message)
                .unwrap_or(fallback);
            return Err(GitHubError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_fake_github, FakeRepo};

    #[test]
    fn test_endpoint_handles_trailing_slash_and_prefix() {
        let client =
            GitHubClient::new(Client::new(), "https://ghe.example.com/api/v3/", "t").unwrap();
        let url = client.endpoint(["repos", "a", "b", "contents", "my dir"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/a/b/contents/my%20dir"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(GitHubClient::new(Client::new(), "mailto:someone@example.com", "t").is_err());
    }

    #[tokio::test]
    async fn test_list_contents_of_directory_and_single_file() {
        let repo = FakeRepo::new()
            .file("src/lib.rs", "pub fn a() {}")
            .file("src/util/mod.rs", "mod x;");
        let server = spawn_fake_github(repo).await;
        let client = GitHubClient::new(Client::new(), &server.base_url, "good").unwrap();

        let listing = client.list_contents("o", "r", "src", "main").await.unwrap();
        let paths: Vec<_> = listing.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["src/lib.rs", "src/util"]);

        let single = client.list_contents("o", "r", "src/lib.rs", "main").await.unwrap();
        assert_eq!(single.len(), 1);
        assert!(single[0].content.is_some());
    }

    #[tokio::test]
    async fn test_missing_path_reports_status_and_message() {
        let server = spawn_fake_github(FakeRepo::new().file("a.txt", "a")).await;
        let client = GitHubClient::new(Client::new(), &server.base_url, "good").unwrap();

        let err = client.list_contents("o", "r", "nope", "main").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Not Found"));
    }
}
