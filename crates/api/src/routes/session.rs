//! Route definitions for the `/sessions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{annotation, csv, image, navigation, session, stats};
use crate::state::AppState;
use crate::ws;

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /                                  -> list_sessions
/// POST   /                                  -> create_session
/// GET    /{id}                              -> get_session
/// DELETE /{id}                              -> delete_session
/// POST   /{id}/load                         -> load_images
/// POST   /{id}/reset                        -> reset_session
///
/// GET    /{id}/annotations                  -> list_annotations
/// DELETE /{id}/annotations                  -> clear_annotations
/// GET    /{id}/annotations/{image_id}       -> get_annotation
/// PUT    /{id}/annotations/{image_id}       -> save_annotation (?advance=bool)
/// DELETE /{id}/annotations/{image_id}       -> delete_annotation
/// POST   /{id}/quick-action                 -> quick_action
///
/// GET    /{id}/cursor                       -> get_cursor
/// POST   /{id}/cursor/move                  -> move_cursor
/// POST   /{id}/cursor/jump                  -> jump_cursor
/// POST   /{id}/cursor/next-unannotated      -> next_unannotated
/// GET    /{id}/unannotated                  -> list_unannotated
///
/// GET    /{id}/stats                        -> get_stats
/// GET    /{id}/progress                     -> get_progress
///
/// GET    /{id}/export.csv                   -> export_csv
/// POST   /{id}/import                       -> import_csv (raw CSV body)
/// POST   /{id}/bulk                         -> apply_bulk
///
/// GET    /{id}/images/{image_id}            -> get_image
/// GET    /{id}/ws                           -> ws_handler
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(session::list_sessions).post(session::create_session),
        )
        .route(
            "/{id}",
            get(session::get_session).delete(session::delete_session),
        )
        .route("/{id}/load", post(session::load_images))
        .route("/{id}/reset", post(session::reset_session))
        // Annotations
        .route(
            "/{id}/annotations",
            get(annotation::list_annotations).delete(annotation::clear_annotations),
        )
        .route(
            "/{id}/annotations/{image_id}",
            get(annotation::get_annotation)
                .put(annotation::save_annotation)
                .delete(annotation::delete_annotation),
        )
        .route("/{id}/quick-action", post(annotation::quick_action))
        // Navigation
        .route("/{id}/cursor", get(navigation::get_cursor))
        .route("/{id}/cursor/move", post(navigation::move_cursor))
        .route("/{id}/cursor/jump", post(navigation::jump_cursor))
        .route(
            "/{id}/cursor/next-unannotated",
            post(navigation::next_unannotated),
        )
        .route("/{id}/unannotated", get(navigation::list_unannotated))
        // Statistics
        .route("/{id}/stats", get(stats::get_stats))
        .route("/{id}/progress", get(stats::get_progress))
        // CSV and bulk
        .route("/{id}/export.csv", get(csv::export_csv))
        .route("/{id}/import", post(csv::import_csv))
        .route("/{id}/bulk", post(csv::apply_bulk))
        // Images and live updates
        .route("/{id}/images/{image_id}", get(image::get_image))
        .route("/{id}/ws", get(ws::ws_handler))
}

