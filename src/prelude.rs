//! Curated re-exports for common usage.

pub use crate::api::ApiClient;
pub use crate::auth::{
    AuthError, AuthManager, ConsentFlow, ConsentOutcome, CredentialStore, Credentials,
    FileCredentialStore, MemoryCredentialStore, TokenRecord,
};
pub use crate::bridge::{BridgeRequest, BridgeResponse, MessageBridge};
pub use crate::config::OAuthConfig;
pub use crate::error::{CrossfadeError, Result};
