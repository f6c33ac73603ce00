//! Shared HTTP client setup and status classification.

use std::time::Duration;

use hls_common::{HlsError, HlsResult};
use reqwest::{Client, StatusCode};

/// Default timeout for listing, token and download requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_client(timeout: Duration) -> HlsResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| HlsError::Unavailable(format!("Failed to create HTTP client: {}", e)))
}

/// Map a non-success status to the storage error taxonomy.
pub(crate) fn status_error(status: StatusCode, what: &str) -> HlsError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            HlsError::Unauthorized(format!("{}: HTTP {}", what, status))
        }
        _ => HlsError::Unavailable(format!("{}: HTTP {}", what, status)),
    }
}

pub(crate) fn transport_error(err: reqwest::Error, what: &str) -> HlsError {
    HlsError::Unavailable(format!("{}: {}", what, err))
}

/// Strip the query string so SAS signatures never reach the logs.
pub(crate) fn redact(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}
