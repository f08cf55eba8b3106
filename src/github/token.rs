// src/github/token.rs
// =============================================================================
// Token validation: one authenticated "who am I" call before a walk starts,
// so a bad token fails fast instead of burning API quota on a doomed walk.
// =============================================================================

use tracing::debug;

use super::client::GitHubClient;
use crate::error::AppError;

// Maps the /user result:
//   401 -> CredentialInvalid
//   403 -> CredentialInsufficientScope
//   anything else -> passed through as an upstream failure
pub async fn validate_token(client: &GitHubClient) -> Result<(), AppError> {
    match client.authenticated_user().await {
        Ok(user) => {
            debug!(login = %user.login, "GitHub token accepted");
            Ok(())
        }
        Err(err) => match err.status() {
            Some(401) => Err(AppError::CredentialInvalid),
            Some(403) => Err(AppError::CredentialInsufficientScope),
            _ => Err(err.into()),
        },
    }
}
