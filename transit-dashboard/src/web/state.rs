//! Application state for the web layer.

use crate::dashboard::DashboardHandle;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the running dashboard
    pub dashboard: DashboardHandle,
}

impl AppState {
    pub fn new(dashboard: DashboardHandle) -> Self {
        Self { dashboard }
    }
}
