use thiserror::Error;

/// Normalized errors for the login and token lifecycle.
///
/// `Clone` because a refresh outcome is fanned out to every caller attached to
/// the in-flight refresh handle; variants therefore carry owned strings rather
/// than source errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The user closed or denied the consent view.
    #[error("User cancelled the authorization flow")]
    UserCancelled,

    /// The redirect back from the provider was malformed (no code, bad state).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The code verifier vanished between starting the flow and the exchange.
    #[error("Authorization state lost; restart the login flow")]
    StateLost,

    /// No code verifier in the credential store at exchange time.
    #[error("No code verifier stored")]
    MissingVerifier,

    /// A refresh was requested but no refresh token is stored.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The token endpoint answered with a non-success status.
    #[error("Token endpoint returned status {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    /// The token endpoint answered 2xx but the payload was unusable.
    #[error("Malformed token response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
