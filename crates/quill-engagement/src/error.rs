//! Error types for backend synchronisation.
//!
//! None of these reach the viewer: reads fall back to sample content and
//! write failures are logged and dropped.

use thiserror::Error;

/// Engagement errors
#[derive(Debug, Error)]
pub enum EngagementError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Backend could not be reached at all
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Preference store could not be read or written
    #[error("Preference storage error: {0}")]
    Storage(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngagementError {
    /// Whether the backend itself rejected the request (as opposed to
    /// never receiving it).
    pub fn is_rejection(&self) -> bool {
        matches!(self, EngagementError::Status { .. } | EngagementError::NotFound(_))
    }
}

/// Result type for engagement operations
pub type EngagementResult<T> = Result<T, EngagementError>;
