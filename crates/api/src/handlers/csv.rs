//! CSV export/import and bulk labelling.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use stylemark_core::bulk::BulkTemplate;
use stylemark_core::types::SessionId;

use crate::error::AppResult;
use crate::handlers::publish;
use crate::response::{DataResponse, Mutation};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub applied: usize,
}

/// GET /sessions/{id}/export.csv
///
/// 204 when there is nothing to export.
pub async fn export_csv(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Response> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;

    let Some(bytes) = session.export_csv()? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let stem = match session.source_label() {
        "" => "annotations".to_string(),
        label => label.replace(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_', "_"),
    };
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{stem}.csv\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"annotations.csv\""));

    tracing::info!(session_id = %id, records = session.store().len(), "Annotations exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// POST /sessions/{id}/import
///
/// Body is the raw CSV file. A missing required column rejects the whole
/// file with 422 before any row is applied.
pub async fn import_csv(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let (report, change) = session.import_csv(&body)?;
    let change = publish(&state, id, change);

    Ok(Json(DataResponse {
        data: Mutation {
            result: report,
            change,
        },
    }))
}

/// POST /sessions/{id}/bulk
///
/// Apply a complete label set to every unannotated image.
pub async fn apply_bulk(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(template): Json<BulkTemplate>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let change = session.apply_bulk(&template)?;
    let applied = match change.kind {
        stylemark_core::ChangeKind::BulkApplied { applied } => applied,
        _ => 0,
    };
    let change = publish(&state, id, change);

    Ok(Json(DataResponse {
        data: Mutation {
            result: BulkResult { applied },
            change,
        },
    }))
}
