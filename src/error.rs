// src/error.rs
// =============================================================================
// Error types shared by the HTTP server and the download command.
//
// Every top-level failure becomes one AppError variant. The server turns an
// AppError into a status code and a JSON body of the form
//   { "error": "<message>", "code": "<optional machine code>" }
//
// Per-file failures (one download URL that 404s, one directory listing that
// times out) are NOT AppErrors. They are recorded as values and the overall
// operation keeps going.
// =============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::github::GitHubError;

#[derive(Debug, Error)]
pub enum AppError {
    /// No credential header was sent.
    /// Clients match on this exact text to decide whether to prompt for a token.
    #[error("Missing token")]
    MissingCredential,

    /// GitHub answered the token check with 401
    #[error("GitHub token is invalid or expired")]
    CredentialInvalid,

    /// GitHub answered the token check with 403
    #[error("GitHub token has insufficient permissions")]
    CredentialInsufficientScope,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Shared-secret check failed (image endpoint)
    #[error("{0}")]
    Unauthorized(String),

    #[error("upstream request failed: {0}")]
    UpstreamFetch(String),

    #[error("Failed to create zip file: {0}")]
    ArchiveAssembly(String),

    #[error("image processing failed: {0}")]
    ImageProcessing(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential => StatusCode::UNAUTHORIZED,
            AppError::CredentialInvalid => StatusCode::UNAUTHORIZED,
            AppError::CredentialInsufficientScope => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
            AppError::ArchiveAssembly(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ImageProcessing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the token failures, so clients don't have
    /// to parse messages for those.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::CredentialInvalid => Some("TOKEN_INVALID"),
            AppError::CredentialInsufficientScope => Some("TOKEN_INSUFFICIENT_SCOPE"),
            _ => None,
        }
    }

    // The message shown to callers. Archive failures hide the inner cause
    // (it is logged instead) and report a generic failure.
    fn public_message(&self) -> String {
        match self {
            AppError::ArchiveAssembly(_) => "Failed to create zip file".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

// Any GitHub failure that reaches the top level (i.e. was not absorbed by the
// walk) is reported as an upstream failure
impl From<GitHubError> for AppError {
    fn from(err: GitHubError) -> Self {
        AppError::UpstreamFetch(err.to_string())
    }
}
