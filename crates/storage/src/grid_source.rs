//! Where the tiling-system table comes from.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use hls_common::{GridIndex, HlsError, HlsResult};
use tracing::{info, instrument};

use crate::http::build_client;

/// The published table is a few megabytes of text.
const GRID_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Location of a whitespace-delimited tiling table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSource {
    Url(String),
    Path(PathBuf),
    /// Table text already in memory.
    Inline(String),
}

impl FromStr for GridSource {
    type Err = HlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HlsError::InvalidArgument {
                param: "grid.source".to_string(),
                message: "empty grid source".to_string(),
            });
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(GridSource::Url(s.to_string()))
        } else {
            Ok(GridSource::Path(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for GridSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSource::Url(url) => f.write_str(url),
            GridSource::Path(path) => write!(f, "{}", path.display()),
            GridSource::Inline(_) => f.write_str("<inline>"),
        }
    }
}

/// Fetch or read the table and build the index.
///
/// Any failure to obtain the text, and any malformed content, is a
/// `GridLoad` error.
#[instrument(skip(source), fields(source = %source))]
pub async fn load_grid(source: &GridSource) -> HlsResult<GridIndex> {
    let text = match source {
        GridSource::Url(url) => fetch_text(url).await?,
        GridSource::Path(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HlsError::GridLoad(format!("{}: {}", path.display(), e)))?,
        GridSource::Inline(text) => text.clone(),
    };

    let index = GridIndex::parse(&text)?;
    info!(tiles = index.len(), "Loaded tile grid");
    Ok(index)
}

async fn fetch_text(url: &str) -> HlsResult<String> {
    let client = build_client(GRID_FETCH_TIMEOUT).map_err(|e| HlsError::GridLoad(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| HlsError::GridLoad(format!("Request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HlsError::GridLoad(format!("{} returned HTTP {}", url, status)));
    }

    response
        .text()
        .await
        .map_err(|e| HlsError::GridLoad(format!("Failed to read body from {}: {}", url, e)))
}
