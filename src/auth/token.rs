use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Token pair persisted in the credential store.
///
/// An access token always carries its absolute expiry; "logged in" is derived
/// from this record, never stored separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Whether the access token has passed its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Wire shape of a token endpoint response.
///
/// `access_token` is optional so a 2xx body without one surfaces as
/// [`AuthError::MalformedResponse`] instead of a decode failure.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    #[allow(dead_code)]
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Build a [`TokenRecord`] from this response.
    ///
    /// The refresh token rotates only when the response supplies one;
    /// otherwise `previous_refresh` is retained.
    pub(crate) fn into_record(
        self,
        previous_refresh: Option<String>,
    ) -> Result<TokenRecord, AuthError> {
        let access_token = self
            .access_token
            .ok_or_else(|| AuthError::MalformedResponse("missing access_token".to_string()))?;
        let expires_in = self
            .expires_in
            .ok_or_else(|| AuthError::MalformedResponse("missing expires_in".to_string()))?;
        Ok(TokenRecord {
            access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}
