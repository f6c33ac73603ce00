//! Error types for HLS tile lookup and storage access.

use thiserror::Error;

/// Result type alias using HlsError.
pub type HlsResult<T> = Result<T, HlsError>;

/// Primary error type for tile lookup, key building and storage access.
///
/// "Nothing found" is never an error: a coordinate outside the tiling
/// coverage or a prefix with no objects is reported as `None` or an empty
/// listing instead.
#[derive(Debug, Error)]
pub enum HlsError {
    // === Input Errors ===
    #[error("Failed to load tile grid: {0}")]
    GridLoad(String),

    #[error("Invalid value for '{param}': {message}")]
    InvalidArgument { param: String, message: String },

    #[error("Coordinate out of range: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    // === Storage Errors ===
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage rejected credential: {0}")]
    Unauthorized(String),
}

impl HlsError {
    pub(crate) fn invalid(param: &str, message: impl Into<String>) -> Self {
        HlsError::InvalidArgument {
            param: param.to_string(),
            message: message.into(),
        }
    }

    /// True when an external collaborator could not serve the request.
    ///
    /// Covers both unreachable services and rejected credentials, which are
    /// the two flavours of an unavailable store.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, HlsError::Unavailable(_) | HlsError::Unauthorized(_))
    }

    /// True when the caller should obtain a fresh credential before retrying.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, HlsError::Unauthorized(_))
    }
}

impl From<std::io::Error> for HlsError {
    fn from(err: std::io::Error) -> Self {
        HlsError::Unavailable(err.to_string())
    }
}
