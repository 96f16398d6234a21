//! Provider and client configuration.

const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Scopes the extension needs: profile display plus playlist membership edits.
const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "playlist-modify-private",
    "playlist-modify-public",
];

/// OAuth client settings for one streaming-service application.
///
/// The `with_*` setters exist so tests can point every endpoint at a mock
/// server.
///
/// # Example
/// ```no_run
/// use crossfade::config::OAuthConfig;
///
/// let config = OAuthConfig::new(
///     "client-id",
///     "https://extension.example/callback",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Load from environment variables, reading `.env` if present.
    ///
    /// `CROSSFADE_CLIENT_ID` and `CROSSFADE_REDIRECT_URI` are required; the
    /// endpoint overrides are optional.
    pub fn from_env() -> Option<Self> {
        let _ = dotenvy::dotenv();
        let client_id = std::env::var("CROSSFADE_CLIENT_ID").ok()?;
        let redirect_uri = std::env::var("CROSSFADE_REDIRECT_URI").ok()?;
        let mut config = Self::new(client_id, redirect_uri);
        if let Ok(url) = std::env::var("CROSSFADE_AUTHORIZE_URL") {
            config.authorize_url = url;
        }
        if let Ok(url) = std::env::var("CROSSFADE_TOKEN_URL") {
            config.token_url = url;
        }
        if let Ok(url) = std::env::var("CROSSFADE_API_BASE_URL") {
            config.api_base_url = url;
        }
        Some(config)
    }

    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Space-delimited scope list as the authorize endpoint expects it.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_provider_endpoints() {
        let config = OAuthConfig::new("id", "https://ext/callback");
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.scopes.len(), 4);
    }

    #[test]
    fn scope_param_is_space_delimited() {
        let config = OAuthConfig::new("id", "uri").with_scopes(["a", "b", "c"]);
        assert_eq!(config.scope_param(), "a b c");
    }

    #[test]
    fn setters_override_endpoints() {
        let config = OAuthConfig::new("id", "uri")
            .with_authorize_url("http://localhost/authorize")
            .with_token_url("http://localhost/token")
            .with_api_base_url("http://localhost/v1");
        assert_eq!(config.authorize_url, "http://localhost/authorize");
        assert_eq!(config.token_url, "http://localhost/token");
        assert_eq!(config.api_base_url, "http://localhost/v1");
    }
}
