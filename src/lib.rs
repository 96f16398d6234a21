//! Crossfade: companion core for a browser music extension.
//!
//! Owns the OAuth PKCE login flow against a music-streaming provider,
//! persistent credential storage, transparent (single-flight) token refresh,
//! and the authenticated REST client used for catalog search and playlist
//! membership. Rendering, theming, and the concrete browser messaging
//! transport live in the extension shell, not here.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use crossfade::prelude::*;
//!
//! # async fn example(consent: &dyn ConsentFlow) -> crossfade::error::Result<()> {
//! let config = OAuthConfig::new("client-id", "https://extension.example/callback");
//! let auth = Arc::new(AuthManager::new(config, Arc::new(FileCredentialStore::new_default())));
//!
//! auth.login(consent).await?;
//!
//! let api = ApiClient::new(auth);
//! let results = api.search_tracks("night drive", 20, 0).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod bridge;
pub mod config;
pub mod error;
pub mod prelude;
