//! Interactive authorization flow: URL construction and redirect parsing.

use async_trait::async_trait;
use url::Url;

use crate::config::OAuthConfig;

use super::error::AuthError;

/// How the user-interactive consent step ended.
#[derive(Debug, Clone)]
pub enum ConsentOutcome {
    /// The provider redirected back; the full redirect URL is captured.
    Redirected(String),
    /// The user closed the consent view before the provider redirected.
    Cancelled,
}

/// Seam to the browser-interactive consent step.
///
/// The extension shell implements this over its tab machinery; tests supply a
/// canned outcome. Implementations must resolve when the user closes the view
/// rather than hanging indefinitely.
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    async fn authorize(&self, authorize_url: &str) -> Result<ConsentOutcome, AuthError>;
}

/// Build the provider authorization URL for an S256 code challenge.
pub fn build_authorize_url(config: &OAuthConfig, challenge: &str, state: &str) -> Result<Url, AuthError> {
    let mut url = Url::parse(&config.authorize_url)
        .map_err(|err| AuthError::Protocol(format!("invalid authorize URL: {err}")))?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("state", state)
        .append_pair("scope", &config.scope_param())
        .append_pair("code_challenge_method", "S256")
        .append_pair("code_challenge", challenge);
    Ok(url)
}

/// Extract the authorization code from the provider redirect.
///
/// A `state` echoed back must match the one sent. An `error=access_denied`
/// means the user denied consent; any other `error` or a missing `code` is a
/// protocol failure.
pub fn parse_redirect(redirect_url: &str, expected_state: &str) -> Result<String, AuthError> {
    let url = Url::parse(redirect_url)
        .map_err(|err| AuthError::Protocol(format!("invalid redirect URL: {err}")))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match error.as_deref() {
        Some("access_denied") => return Err(AuthError::UserCancelled),
        Some(other) => {
            return Err(AuthError::Protocol(format!(
                "authorization failed: {other}"
            )))
        }
        None => {}
    }
    if let Some(returned) = state {
        if returned != expected_state {
            return Err(AuthError::Protocol("state mismatch in redirect".to_string()));
        }
    }
    code.ok_or_else(|| AuthError::Protocol("no code found in redirect URL".to_string()))
}
