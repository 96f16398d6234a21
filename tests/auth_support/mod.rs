#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use url::Url;

use crossfade::auth::{
    AuthError, AuthManager, ConsentFlow, ConsentOutcome, CredentialStore, Credentials,
    MemoryCredentialStore, TokenRecord,
};
use crossfade::config::OAuthConfig;

pub const CLIENT_ID: &str = "client-123";
pub const REDIRECT_URI: &str = "https://extension.example/callback";

/// Config pointing every endpoint at a mock server.
pub fn mock_config(server_uri: &str) -> OAuthConfig {
    OAuthConfig::new(CLIENT_ID, REDIRECT_URI)
        .with_authorize_url(format!("{server_uri}/authorize"))
        .with_token_url(format!("{server_uri}/api/token"))
        .with_api_base_url(server_uri.to_string())
}

pub fn manager(server_uri: &str, store: Arc<MemoryCredentialStore>) -> AuthManager {
    AuthManager::new(mock_config(server_uri), store)
}

pub fn fresh_token(access: &str) -> TokenRecord {
    TokenRecord {
        access_token: access.to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

pub fn expired_token(access: &str) -> TokenRecord {
    TokenRecord {
        access_token: access.to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expires_at: Utc::now() - Duration::minutes(5),
    }
}

pub fn store_with_token(token: TokenRecord) -> Arc<MemoryCredentialStore> {
    let store = Arc::new(MemoryCredentialStore::new());
    store
        .save(&Credentials {
            code_verifier: None,
            token: Some(token),
        })
        .expect("seed store");
    store
}

pub fn store_with_verifier(verifier: &str) -> Arc<MemoryCredentialStore> {
    let store = Arc::new(MemoryCredentialStore::new());
    store
        .save(&Credentials {
            code_verifier: Some(verifier.to_string()),
            token: None,
        })
        .expect("seed store");
    store
}

/// What a scripted consent step should do once the authorize URL opens.
#[derive(Debug, Clone)]
pub enum ConsentScript {
    /// Redirect back with this code, echoing the state from the URL.
    RedirectWithCode(String),
    /// Redirect back with the echoed state but no code.
    RedirectWithoutCode,
    /// Redirect back with this code and a bogus state.
    RedirectWrongState(String),
    /// Redirect back with `error=access_denied`.
    Deny,
    /// Close the consent view.
    Cancel,
}

/// Canned [`ConsentFlow`] that records the authorize URLs it was given.
pub struct ScriptedConsent {
    script: ConsentScript,
    pub seen_urls: Mutex<Vec<String>>,
}

impl ScriptedConsent {
    pub fn new(script: ConsentScript) -> Self {
        Self {
            script,
            seen_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn last_url(&self) -> Option<String> {
        self.seen_urls
            .lock()
            .expect("url lock poisoned")
            .last()
            .cloned()
    }
}

#[async_trait]
impl ConsentFlow for ScriptedConsent {
    async fn authorize(&self, authorize_url: &str) -> Result<ConsentOutcome, AuthError> {
        self.seen_urls
            .lock()
            .expect("url lock poisoned")
            .push(authorize_url.to_string());

        let url = Url::parse(authorize_url)
            .map_err(|err| AuthError::Protocol(format!("bad authorize URL in test: {err}")))?;
        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };
        let state = param("state").unwrap_or_default();
        let redirect_uri = param("redirect_uri").unwrap_or_else(|| REDIRECT_URI.to_string());

        let redirect = match &self.script {
            ConsentScript::RedirectWithCode(code) => {
                format!("{redirect_uri}?code={code}&state={state}")
            }
            ConsentScript::RedirectWithoutCode => format!("{redirect_uri}?state={state}"),
            ConsentScript::RedirectWrongState(code) => {
                format!("{redirect_uri}?code={code}&state=not-the-state")
            }
            ConsentScript::Deny => {
                format!("{redirect_uri}?error=access_denied&state={state}")
            }
            ConsentScript::Cancel => return Ok(ConsentOutcome::Cancelled),
        };
        Ok(ConsentOutcome::Redirected(redirect))
    }
}
