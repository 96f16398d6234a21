//! Typed command/response interface for the extension messaging channel.
//!
//! The UI execution context sends commands over the browser's messaging
//! bridge; this module gives those messages a fixed shape instead of an
//! action-string switch. Failures cross the bridge as `success: false` with a
//! rendered error, never as a panic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::AuthManager;

/// Commands the UI context may invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BridgeRequest {
    /// Exchange an authorization code captured by the callback page.
    GetToken { code: String },
    /// Refresh the stored access token.
    RefreshToken,
}

/// Reply sent back over the messaging channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    fn ok(token: String) -> Self {
        Self {
            success: true,
            token: Some(token),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            token: None,
            error: Some(error),
        }
    }
}

/// Dispatches bridge commands onto the shared [`AuthManager`].
pub struct MessageBridge {
    auth: Arc<AuthManager>,
}

impl MessageBridge {
    pub fn new(auth: Arc<AuthManager>) -> Self {
        Self { auth }
    }

    pub async fn handle(&self, request: BridgeRequest) -> BridgeResponse {
        let result = match request {
            BridgeRequest::GetToken { code } => self.auth.exchange_code(&code).await,
            BridgeRequest::RefreshToken => self.auth.refresh().await,
        };
        match result {
            Ok(record) => BridgeResponse::ok(record.access_token),
            Err(err) => BridgeResponse::failed(err.to_string()),
        }
    }
}
