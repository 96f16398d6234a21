//! Login, code exchange, and single-flight token refresh.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::config::OAuthConfig;

use super::error::AuthError;
use super::flow::{self, ConsentFlow, ConsentOutcome};
use super::pkce;
use super::store::{CredentialStore, Credentials};
use super::token::{TokenRecord, TokenResponse};

type RefreshHandle = Shared<BoxFuture<'static, Result<TokenRecord, AuthError>>>;

/// Owns the OAuth token lifecycle: interactive login, authorization-code
/// exchange, and refresh.
///
/// Concurrent refreshes coalesce into one network call: the first caller
/// publishes a shared future, later callers attach to it, and the slot is
/// cleared once it settles. The provider may invalidate a refresh token after
/// first use, so parallel refresh requests would strand every caller but one.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use crossfade::auth::{AuthManager, FileCredentialStore};
/// use crossfade::config::OAuthConfig;
///
/// let config = OAuthConfig::new("client-id", "https://extension.example/callback");
/// let manager = AuthManager::new(config, Arc::new(FileCredentialStore::new_default()));
/// ```
pub struct AuthManager {
    config: OAuthConfig,
    client: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    refresh_gate: Mutex<Option<RefreshHandle>>,
}

impl AuthManager {
    pub fn new(config: OAuthConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            store,
            refresh_gate: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Run the interactive authorization step and return the code.
    ///
    /// The verifier is persisted before the consent view opens: the redirect
    /// may land in a different execution context that has to read it back.
    pub async fn start_auth_flow(&self, consent: &dyn ConsentFlow) -> Result<String, AuthError> {
        let verifier = pkce::generate_verifier(pkce::MAX_VERIFIER_LENGTH);
        let challenge = pkce::derive_challenge(&verifier);
        let state = pkce::generate_state();

        let mut credentials = self.store.load()?.unwrap_or_default();
        credentials.code_verifier = Some(verifier);
        self.store.save(&credentials)?;

        let url = flow::build_authorize_url(&self.config, &challenge, &state)?;
        debug!("opening consent view");
        match consent.authorize(url.as_str()).await? {
            ConsentOutcome::Redirected(redirect_url) => flow::parse_redirect(&redirect_url, &state),
            ConsentOutcome::Cancelled => Err(AuthError::UserCancelled),
        }
    }

    /// Full login: interactive flow followed by the code exchange.
    pub async fn login(&self, consent: &dyn ConsentFlow) -> Result<TokenRecord, AuthError> {
        let code = self.start_auth_flow(consent).await?;
        match self.exchange_code(&code).await {
            // The flow just wrote a verifier; its disappearance means the
            // store was cleared under us mid-flow.
            Err(AuthError::MissingVerifier) => Err(AuthError::StateLost),
            other => other,
        }
    }

    /// Exchange an authorization code for a token pair.
    ///
    /// Uses the stored code verifier and discards it on success.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenRecord, AuthError> {
        let credentials = self.store.load()?.unwrap_or_default();
        let verifier = credentials
            .code_verifier
            .clone()
            .ok_or(AuthError::MissingVerifier)?;

        debug!("exchanging authorization code");
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code_verifier", verifier.as_str()),
            ])
            .send()
            .await?;

        let record = Self::parse_token_response(response, None).await?;
        self.store.save(&Credentials {
            code_verifier: None,
            token: Some(record.clone()),
        })?;
        Ok(record)
    }

    /// Refresh the access token, coalescing concurrent callers.
    pub async fn refresh(&self) -> Result<TokenRecord, AuthError> {
        let handle = {
            let mut gate = self.lock_gate();
            if let Some(existing) = gate.as_ref() {
                existing.clone()
            } else {
                let fresh = Self::run_refresh(
                    self.client.clone(),
                    self.config.clone(),
                    Arc::clone(&self.store),
                )
                .boxed()
                .shared();
                *gate = Some(fresh.clone());
                fresh
            }
        };

        let result = handle.clone().await;

        let mut gate = self.lock_gate();
        if gate.as_ref().is_some_and(|current| current.ptr_eq(&handle)) {
            *gate = None;
        }
        drop(gate);
        result
    }

    /// Current access token, if any (expired or not).
    pub fn access_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.current_token()?.map(|token| token.access_token))
    }

    /// Current token record, if any.
    ///
    /// An unreadable store counts as logged out rather than an error; the
    /// user recovers by logging in again.
    pub fn current_token(&self) -> Result<Option<TokenRecord>, AuthError> {
        match self.store.load() {
            Ok(credentials) => Ok(credentials.and_then(|credentials| credentials.token)),
            Err(AuthError::Serialization(err)) => {
                warn!(error = %err, "unreadable credential store; treating as logged out");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Whether a non-expired access token is stored.
    pub fn logged_in(&self) -> Result<bool, AuthError> {
        Ok(self
            .current_token()?
            .is_some_and(|token| !token.is_expired()))
    }

    /// Drop all stored credentials.
    pub fn logout(&self) -> Result<(), AuthError> {
        debug!("clearing stored credentials");
        self.store.clear()
    }

    fn lock_gate(&self) -> MutexGuard<'_, Option<RefreshHandle>> {
        self.refresh_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn run_refresh(
        client: reqwest::Client,
        config: OAuthConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<TokenRecord, AuthError> {
        let credentials = store.load()?.unwrap_or_default();
        let refresh_token = credentials
            .token
            .as_ref()
            .and_then(|token| token.refresh_token.clone())
            .ok_or(AuthError::NoRefreshToken)?;

        debug!("refreshing access token");
        let response = client
            .post(&config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", config.client_id.as_str()),
            ])
            .send()
            .await?;

        let record = Self::parse_token_response(response, Some(refresh_token)).await?;
        store.save(&Credentials {
            code_verifier: credentials.code_verifier,
            token: Some(record.clone()),
        })?;
        Ok(record)
    }

    async fn parse_token_response(
        response: reqwest::Response,
        previous_refresh: Option<String>,
    ) -> Result<TokenRecord, AuthError> {
        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status, "token endpoint rejected request");
            return Err(AuthError::TokenEndpoint { status, body });
        }
        let raw = response.text().await?;
        let payload: TokenResponse = serde_json::from_str(&raw)
            .map_err(|err| AuthError::MalformedResponse(err.to_string()))?;
        payload.into_record(previous_refresh)
    }
}
