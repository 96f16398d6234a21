//! Error types for crossfade.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for API-facing operations.
#[derive(Error, Debug)]
pub enum CrossfadeError {
    /// No access token in the credential store; the call was never issued.
    #[error("Not authenticated")]
    Unauthenticated,

    /// A freshly refreshed token was still rejected; stored credentials were cleared.
    #[error("Authorization expired")]
    AuthExpired,

    #[error("API request failed (status {status}): {status_text}")]
    Api { status: u16, status_text: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl CrossfadeError {
    /// Create an API error from a status code and reason phrase.
    pub fn api(status: u16, status_text: impl Into<String>) -> Self {
        Self::Api {
            status,
            status_text: status_text.into(),
        }
    }

    /// Whether the user can recover by simply retrying the action.
    ///
    /// Auth-state failures require a fresh login instead.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => matches!(status, 429 | 500..=599),
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CrossfadeError>;
