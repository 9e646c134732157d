use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use stylemark_core::types::SessionId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /sessions/{id}/stats
///
/// Totals, distributions, warnings and progress, computed fresh.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let report = handle.lock().await.stats();
    Ok(Json(DataResponse { data: report }))
}

/// GET /sessions/{id}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let progress = handle.lock().await.progress();
    Ok(Json(DataResponse { data: progress }))
}
