//! Data source error types.

use super::convert::ConversionError;

/// Errors from a single data source fetch.
///
/// Every variant collapses to "resource unavailable" once it reaches a
/// resource slot; the variants only shape the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure (connection refused, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response parsed but contained unusable values
    #[error("malformed payload: {0}")]
    Convert(#[from] ConversionError),
}
