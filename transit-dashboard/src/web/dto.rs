//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query string for the dashboard view.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Station search text
    #[serde(default)]
    pub q: Option<String>,
}

/// Body returned when an intent has been queued.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    /// What was queued, e.g. "select" or "reload"
    pub intent: &'static str,

    /// Target of the intent, when it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
