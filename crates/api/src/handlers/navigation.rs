//! Cursor movement and the unannotated-images view.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use stylemark_core::annotation::Annotation;
use stylemark_core::session::Session;
use stylemark_core::types::SessionId;
use stylemark_core::ChangeEvent;

use crate::error::AppResult;
use crate::handlers::publish;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub delta: isize,
}

#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub index: usize,
}

/// Where the cursor is and what it points at.
///
/// `change` is absent when the call did not move the cursor.
#[derive(Debug, Serialize)]
pub struct CursorView {
    pub position: Option<usize>,
    pub image_count: usize,
    pub current_image: Option<String>,
    pub current_annotation: Option<Annotation>,
    pub change: Option<ChangeEvent>,
}

impl CursorView {
    fn of(session: &Session, change: Option<ChangeEvent>) -> Self {
        Self {
            position: session.cursor().position(),
            image_count: session.images().len(),
            current_image: session.current_image().map(str::to_string),
            current_annotation: session.current_annotation().cloned(),
            change,
        }
    }
}

/// GET /sessions/{id}/cursor
pub async fn get_cursor(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    Ok(Json(DataResponse {
        data: CursorView::of(&session, None),
    }))
}

/// POST /sessions/{id}/cursor/move
///
/// Relative move, clamped to the image set.
pub async fn move_cursor(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<MoveRequest>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    let change = session
        .move_cursor(input.delta)
        .map(|c| publish(&state, id, c));
    Ok(Json(DataResponse {
        data: CursorView::of(&session, change),
    }))
}

/// POST /sessions/{id}/cursor/jump
pub async fn jump_cursor(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<JumpRequest>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    let change = publish(&state, id, session.jump(input.index)?);
    Ok(Json(DataResponse {
        data: CursorView::of(&session, Some(change)),
    }))
}

/// POST /sessions/{id}/cursor/next-unannotated
///
/// Leaves the cursor in place when every other image is annotated.
pub async fn next_unannotated(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    let change = session
        .jump_to_next_unannotated()
        .map(|c| publish(&state, id, c));
    Ok(Json(DataResponse {
        data: CursorView::of(&session, change),
    }))
}

/// GET /sessions/{id}/unannotated
///
/// Image ids without a record, in image-set order.
pub async fn list_unannotated(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    let ids: Vec<String> = session
        .list_unannotated()
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok(Json(DataResponse { data: ids }))
}
