//! Handlers for per-image annotation records.
//!
//! Saving is an upsert keyed by image id. Records are always stamped with
//! the session's source label.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use stylemark_core::annotation::{Annotation, AnnotationDraft, Gender};
use stylemark_core::error::CoreError;
use stylemark_core::image_set::normalize_image_id;
use stylemark_core::session::QuickAction;
use stylemark_core::types::SessionId;

use crate::error::{AppError, AppResult};
use crate::handlers::publish;
use crate::response::{DataResponse, Mutation};
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request / response types
   -------------------------------------------------------------------------- */

/// Label values for one image.
///
/// `gender` may be given directly as a wire code, or as the two form
/// checkboxes `male` / `female`. The wire code wins when both are present.
#[derive(Debug, Default, Deserialize)]
pub struct SaveAnnotationRequest {
    pub validity: Option<String>,
    pub gender: Option<String>,
    pub male: Option<bool>,
    pub female: Option<bool>,
    pub category: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl SaveAnnotationRequest {
    fn into_draft(self, image_id: String) -> AnnotationDraft {
        let gender = self.gender.or_else(|| {
            if self.male.is_none() && self.female.is_none() {
                return None;
            }
            Gender::from_flags(self.male.unwrap_or(false), self.female.unwrap_or(false))
                .map(|g| g.as_str().to_string())
        });
        AnnotationDraft {
            image_id,
            validity: self.validity,
            gender,
            category: self.category,
            source_label: String::new(),
            notes: self.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveParams {
    /// Move to the next image after saving. Only valid for the current image.
    #[serde(default)]
    pub advance: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuickActionRequest {
    pub action: QuickAction,
}

#[derive(Debug, Serialize)]
pub struct SavedAnnotation {
    pub annotation: Annotation,
    pub cursor: Option<usize>,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// GET /sessions/{id}/annotations
///
/// All records in insertion order.
pub async fn list_annotations(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    let records: Vec<Annotation> = session.store().iter().cloned().collect();
    Ok(Json(DataResponse { data: records }))
}

/// GET /sessions/{id}/annotations/{image_id}
pub async fn get_annotation(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(SessionId, String)>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    let annotation = session.get(&image_id).cloned().ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Annotation",
            id: image_id.clone(),
        })
    })?;
    Ok(Json(DataResponse { data: annotation }))
}

/// PUT /sessions/{id}/annotations/{image_id}?advance=true
///
/// Create or replace the record for one image.
pub async fn save_annotation(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(SessionId, String)>,
    Query(params): Query<SaveParams>,
    Json(input): Json<SaveAnnotationRequest>,
) -> AppResult<impl IntoResponse> {
    // Same key the image set and store use.
    let image_id = normalize_image_id(&image_id);
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let draft = input.into_draft(image_id.clone());
    let change = if params.advance {
        if session.current_image() != Some(image_id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "'{image_id}' is not the current image; advance applies only to the current image"
            )));
        }
        session.save_current_and_advance(draft)?
    } else {
        session.save(draft)?
    };
    let change = publish(&state, id, change);

    let annotation = session.get(&image_id).cloned().ok_or_else(|| {
        AppError::InternalError(format!("Saved record for '{image_id}' is missing"))
    })?;

    tracing::info!(session_id = %id, image_id = %image_id, advance = params.advance, "Annotation saved");

    Ok(Json(DataResponse {
        data: Mutation {
            result: SavedAnnotation {
                annotation,
                cursor: session.cursor().position(),
            },
            change,
        },
    }))
}

/// POST /sessions/{id}/quick-action
///
/// Apply a one-click label to the current image and advance.
pub async fn quick_action(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<QuickActionRequest>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let image_id = session
        .current_image()
        .map(str::to_string)
        .ok_or(CoreError::OutOfRange { index: 0, len: 0 })?;
    let change = publish(&state, id, session.quick_action(input.action)?);

    let annotation = session.get(&image_id).cloned().ok_or_else(|| {
        AppError::InternalError(format!("Saved record for '{image_id}' is missing"))
    })?;

    Ok(Json(DataResponse {
        data: Mutation {
            result: SavedAnnotation {
                annotation,
                cursor: session.cursor().position(),
            },
            change,
        },
    }))
}

/// DELETE /sessions/{id}/annotations/{image_id}
///
/// Idempotent: deleting an absent record succeeds.
pub async fn delete_annotation(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(SessionId, String)>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    let change = publish(&state, id, session.delete(&image_id));
    Ok(Json(DataResponse { data: change }))
}

/// DELETE /sessions/{id}/annotations
///
/// Drop every record, keeping the image set and cursor.
pub async fn clear_annotations(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<impl IntoResponse> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    let change = publish(&state, id, session.clear_annotations());
    Ok(Json(DataResponse { data: change }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_flags_become_wire_code() {
        let req = SaveAnnotationRequest {
            male: Some(true),
            female: Some(true),
            ..Default::default()
        };
        assert_eq!(req.into_draft("a.jpg".into()).gender.as_deref(), Some("M+F"));
    }

    #[test]
    fn no_flags_leaves_gender_missing() {
        let req = SaveAnnotationRequest {
            male: Some(false),
            female: Some(false),
            ..Default::default()
        };
        assert_eq!(req.into_draft("a.jpg".into()).gender, None);
        assert_eq!(SaveAnnotationRequest::default().into_draft("a".into()).gender, None);
    }

    #[test]
    fn explicit_gender_wins_over_flags() {
        let req = SaveAnnotationRequest {
            gender: Some("F".into()),
            male: Some(true),
            ..Default::default()
        };
        assert_eq!(req.into_draft("a.jpg".into()).gender.as_deref(), Some("F"));
    }
}
