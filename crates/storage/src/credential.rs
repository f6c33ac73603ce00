//! Time-boxed SAS credentials.
//!
//! A SAS token is an opaque query string that the storage service checks on
//! every request. The libraries only carry it; the caller decides when a
//! token is too close to expiry and asks its provider for a new one.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use hls_common::{HlsError, HlsResult};

use crate::http::{build_client, status_error, transport_error, REQUEST_TIMEOUT};

/// Shared access signature plus its expiry, when known.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SasToken {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl SasToken {
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Token without a leading `?`, ready to append after one.
    pub fn query(&self) -> &str {
        self.token.trim_start_matches('?')
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// A token with no known expiry never reports as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expiry) if expiry <= now)
    }

    /// True if the token expires before `now + margin`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        matches!(self.expires_at, Some(expiry) if expiry <= now + margin)
    }
}

impl fmt::Debug for SasToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SasToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of SAS tokens.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_token(&self) -> HlsResult<SasToken>;
}

/// Hands out one fixed token, e.g. from configuration.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: SasToken,
}

impl StaticTokenProvider {
    pub fn new(token: SasToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn get_token(&self) -> HlsResult<SasToken> {
        Ok(self.token.clone())
    }
}

/// Body returned by the Planetary Computer SAS endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
    #[serde(rename = "msft:expiry", default)]
    expiry: Option<DateTime<Utc>>,
}

/// Fetches read tokens from a Planetary Computer style endpoint.
///
/// `GET <endpoint>` answers `{"msft:expiry": "<RFC 3339>", "token": "<sas>"}`.
pub struct PlanetaryComputerTokenProvider {
    client: Client,
    endpoint: String,
}

impl PlanetaryComputerTokenProvider {
    pub fn new(endpoint: impl Into<String>) -> HlsResult<Self> {
        Self::with_timeout(endpoint, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> HlsResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CredentialProvider for PlanetaryComputerTokenProvider {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn get_token(&self) -> HlsResult<SasToken> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| transport_error(e, "Token request failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "Token request rejected"));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| HlsError::Unavailable(format!("Malformed token response: {}", e)))?;

        debug!(expires_at = ?body.expiry, "Obtained SAS token");
        Ok(SasToken::new(body.token, body.expiry))
    }
}
