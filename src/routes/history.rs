use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use super::AppState;
use crate::error::AppError;
use crate::history::HistoryEntry;
use crate::model::RequestDescriptor;

/// Saved requests, most recent first.
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list())
}

pub async fn append_history(
    State(state): State<AppState>,
    payload: Result<Json<RequestDescriptor>, JsonRejection>,
) -> Result<(StatusCode, Json<HistoryEntry>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidBody(e.body_text()))?;
    let entry = state.history.record(&request);
    tracing::debug!(id = entry.id, method = %entry.method, "Saved request to history");
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.history.clear();
    StatusCode::NO_CONTENT
}
