//! Handlers for session lifecycle and image loading.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use stylemark_core::session::Session;
use stylemark_core::source::{DirectorySource, ManualListSource};
use stylemark_core::types::SessionId;
use stylemark_core::{ChangeEvent, CoreError};

use crate::error::{AppError, AppResult};
use crate::handlers::publish;
use crate::response::{DataResponse, Mutation};
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request bodies
   -------------------------------------------------------------------------- */

/// Where to take the image list from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ImageListInput {
    /// Identifiers used verbatim.
    Ids { images: Vec<String> },
    /// Pasted text, one file name per line; cleaned and filtered.
    FileList { text: String },
    /// The server's configured image directory.
    Directory,
}

#[derive(Debug, Deserialize)]
pub struct LoadImagesRequest {
    #[serde(flatten)]
    pub input: ImageListInput,
    #[serde(default)]
    pub source_label: String,
}

/// Body of `POST /sessions`. Loading on creation is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub load: Option<LoadImagesRequest>,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// POST /sessions
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let input: CreateSessionRequest = if body.is_empty() {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid session body: {e}")))?
    };

    let mut session = Session::default();
    if let Some(load) = &input.load {
        load_into(&state, &mut session, load)?;
    }
    let handle = state.sessions.create(session).await?;
    let snapshot = handle.lock().await.snapshot();

    Ok((StatusCode::CREATED, Json(DataResponse { data: snapshot })))
}

/// GET /sessions
pub async fn list_sessions(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let ids = state.sessions.ids().await;
    Ok(Json(DataResponse { data: ids }))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let snapshot = handle.lock().await.snapshot();
    Ok(Json(DataResponse { data: snapshot }))
}

/// DELETE /sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    if !state.sessions.remove(id).await {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: id.to_string(),
        }));
    }
    let closed = state.ws_manager.close_session(id).await;
    tracing::info!(session_id = %id, closed_sockets = closed, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/{id}/load
///
/// Replace the image set. Existing annotations are discarded.
pub async fn load_images(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<LoadImagesRequest>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let change = load_into(&state, &mut session, &input)?;
    let change = publish(&state, id, change);

    Ok(Json(DataResponse {
        data: Mutation {
            result: session.snapshot(),
            change,
        },
    }))
}

/// POST /sessions/{id}/reset
///
/// Clear images, annotations, cursor and label.
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let change = publish(&state, id, session.reset());

    Ok(Json(DataResponse {
        data: Mutation {
            result: session.snapshot(),
            change,
        },
    }))
}

/* --------------------------------------------------------------------------
   Helpers
   -------------------------------------------------------------------------- */

fn load_into(
    state: &AppState,
    session: &mut Session,
    request: &LoadImagesRequest,
) -> AppResult<ChangeEvent> {
    let label = request.source_label.as_str();
    let change = match &request.input {
        ImageListInput::Ids { images } => session.load(images.iter().map(String::as_str), label),
        ImageListInput::FileList { text } => {
            session.load_from_source(&ManualListSource::from_text(text), label)
        }
        ImageListInput::Directory => {
            let dir = state.config.image_dir.as_ref().ok_or_else(|| {
                AppError::BadRequest("No image directory is configured on this server".into())
            })?;
            session.load_from_source(&DirectorySource::new(dir), label)
        }
    };
    Ok(change)
}
