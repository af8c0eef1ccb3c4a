//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::warn;

use crate::dashboard::{DashboardSnapshot, Intent, RuntimeStopped};
use crate::domain::StationId;
use crate::slot::Resource;
use crate::view::DashboardView;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard", get(dashboard_view))
        .route("/api/select/:id", post(select_station))
        .route("/api/markers/:id/click", post(click_marker))
        .route("/api/refresh", post(refresh))
        .route("/api/reload/:resource", post(reload))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The composed dashboard, filtered by `?q=`.
async fn dashboard_view(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<DashboardView> {
    let snapshot = state.dashboard.snapshot();
    Json(DashboardView::compose(
        &snapshot,
        query.q.as_deref().unwrap_or_default(),
    ))
}

/// Select a station from the list.
async fn select_station(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    let id = known_station(&state.dashboard.snapshot(), &raw)?;
    state.dashboard.send(Intent::Select(id.clone())).await?;
    Ok(accepted("select", Some(id.to_string())))
}

/// Select a station through its map marker.
async fn click_marker(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    let snapshot = state.dashboard.snapshot();
    let id = known_station(&snapshot, &raw)?;
    if !snapshot.has_marker(&id) {
        return Err(AppError::NotFound {
            message: format!("No marker for station: {id}"),
        });
    }
    state.dashboard.click_marker(id.clone()).await?;
    Ok(accepted("marker_click", Some(id.to_string())))
}

/// Reload departures for the current selection.
async fn refresh(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    state.dashboard.send(Intent::Refresh).await?;
    Ok(accepted("refresh", None))
}

/// Reload one resource.
async fn reload(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    let resource: Resource = raw.parse().map_err(|e| AppError::BadRequest {
        message: format!("{e}"),
    })?;
    state.dashboard.send(Intent::Reload(resource)).await?;
    Ok(accepted("reload", Some(resource.to_string())))
}

fn accepted(
    intent: &'static str,
    target: Option<String>,
) -> (StatusCode, Json<AcceptedResponse>) {
    (StatusCode::ACCEPTED, Json(AcceptedResponse { intent, target }))
}

/// Parse `raw` and check it names a loaded station.
fn known_station(snapshot: &DashboardSnapshot, raw: &str) -> Result<StationId, AppError> {
    let id = StationId::parse_normalized(raw).map_err(|e| AppError::BadRequest {
        message: format!("Invalid station id: {e}"),
    })?;

    if !snapshot.has_station(&id) {
        return Err(AppError::NotFound {
            message: format!("Unknown station: {id}"),
        });
    }
    Ok(id)
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    Unavailable { message: String },
}

impl From<RuntimeStopped> for AppError {
    fn from(e: RuntimeStopped) -> Self {
        AppError::Unavailable {
            message: e.to_string(),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        warn!(status = status.as_u16(), error = %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
