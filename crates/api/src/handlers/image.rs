//! Serving the pixels of one image in a session.
//!
//! A configured image directory takes precedence; otherwise the client is
//! redirected to `IMAGE_BASE_URL/{image_id}`.

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use stylemark_core::image_set::normalize_image_id;
use stylemark_core::source::{DirectorySource, ImageHandle, ImageSource, ManualListSource};
use stylemark_core::types::SessionId;
use stylemark_core::CoreError;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /sessions/{id}/images/{image_id}
pub async fn get_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(SessionId, String)>,
) -> AppResult<Response> {
    let image_id = normalize_image_id(&image_id);
    let handle = state.sessions.get(id).await?;
    let images = handle.lock().await.images().clone();

    if !images.contains(&image_id) {
        return Err(CoreError::NotFound {
            entity: "Image",
            id: image_id,
        }
        .into());
    }

    let fetched = if let Some(dir) = &state.config.image_dir {
        // File reads happen off the async runtime.
        let source = DirectorySource::new(dir);
        let target = image_id.clone();
        tokio::task::spawn_blocking(move || source.fetch(&target))
            .await
            .map_err(|e| CoreError::Internal(format!("image read task failed: {e}")))??
    } else if let Some(base) = &state.config.image_base_url {
        ManualListSource::new(images.as_slice().to_vec())
            .with_base_url(base.clone())
            .fetch(&image_id)?
    } else {
        return Err(CoreError::Source(
            "no image directory or base URL is configured on this server".into(),
        )
        .into());
    };

    Ok(match fetched {
        ImageHandle::Bytes { data, .. } => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static(content_type_for(&image_id)))],
            data,
        )
            .into_response(),
        ImageHandle::Url { url } => Redirect::temporary(&url).into_response(),
    })
}

/// MIME type from the file extension.
fn content_type_for(image_id: &str) -> &'static str {
    let ext = image_id
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
