//! Bearer-authenticated client for the provider's REST API.

pub mod models;

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::AuthManager;
use crate::error::{CrossfadeError, Result};

use models::{Page, Playlist, PlaylistItem, Profile, SearchResults};

/// Issues API calls with the current access token, refreshing on expiry or a
/// 401 and retrying the original call at most once.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use crossfade::api::ApiClient;
/// use crossfade::auth::{AuthManager, FileCredentialStore};
/// use crossfade::config::OAuthConfig;
///
/// # async fn example() -> crossfade::error::Result<()> {
/// let config = OAuthConfig::new("client-id", "https://extension.example/callback");
/// let auth = Arc::new(AuthManager::new(config, Arc::new(FileCredentialStore::new_default())));
/// let api = ApiClient::new(auth);
/// let results = api.search_tracks("bicycle race", 20, 0).await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    auth: Arc<AuthManager>,
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(auth: Arc<AuthManager>) -> Self {
        let base_url = auth.config().api_base_url.clone();
        Self {
            auth,
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Issue an authenticated request and parse the JSON response.
    ///
    /// Fails fast with [`CrossfadeError::Unauthenticated`] when no token is
    /// stored; the call is never issued. A 401 triggers one refresh and one
    /// retry; a second 401 clears the stored credentials and fails with
    /// [`CrossfadeError::AuthExpired`].
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut token = match self.auth.current_token()? {
            Some(token) => token,
            None => return Err(CrossfadeError::Unauthenticated),
        };
        if token.is_expired() {
            debug!("access token expired; refreshing before request");
            token = self.auth.refresh().await?;
        }

        let url = format!("{}{}", self.base_url, endpoint);
        let mut refreshed = false;
        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(&token.access_token);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::UNAUTHORIZED {
                if refreshed {
                    warn!("refreshed token still rejected; clearing credentials");
                    self.auth.logout()?;
                    return Err(CrossfadeError::AuthExpired);
                }
                debug!(%url, "access token rejected; refreshing");
                token = self.auth.refresh().await?;
                refreshed = true;
                continue;
            }
            if !status.is_success() {
                return Err(CrossfadeError::api(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown"),
                ));
            }

            let text = response.text().await?;
            if text.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }
    }

    pub async fn profile(&self) -> Result<Profile> {
        self.get_json("/me").await
    }

    pub async fn playlists(&self) -> Result<Page<Playlist>> {
        self.get_json("/me/playlists").await
    }

    pub async fn create_playlist(&self, name: &str, description: &str) -> Result<Playlist> {
        let body = serde_json::json!({
            "name": name,
            "description": description,
            "public": false,
        });
        let value = self
            .request(Method::POST, "/me/playlists", Some(&body))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn playlist_tracks(&self, playlist_id: &str) -> Result<Page<PlaylistItem>> {
        self.get_json(&format!("/playlists/{playlist_id}/tracks"))
            .await
    }

    pub async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResults> {
        let params = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .append_pair("type", "track")
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .finish();
        self.get_json(&format!("/search?{params}")).await
    }

    pub async fn add_track(&self, playlist_id: &str, track_uri: &str) -> Result<Value> {
        let body = serde_json::json!({ "uris": [track_uri] });
        self.request(
            Method::POST,
            &format!("/playlists/{playlist_id}/tracks"),
            Some(&body),
        )
        .await
    }

    pub async fn remove_track(&self, playlist_id: &str, track_uri: &str) -> Result<Value> {
        let body = serde_json::json!({ "tracks": [{ "uri": track_uri }] });
        self.request(
            Method::DELETE,
            &format!("/playlists/{playlist_id}/tracks"),
            Some(&body),
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let value = self.request(Method::GET, endpoint, None).await?;
        Ok(serde_json::from_value(value)?)
    }
}
