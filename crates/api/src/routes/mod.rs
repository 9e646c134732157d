pub mod health;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sessions                                      list, create
/// /sessions/{id}                                 get, delete
/// /sessions/{id}/load                            replace image set (POST)
/// /sessions/{id}/reset                           clear everything (POST)
/// /sessions/{id}/annotations                     list, clear all
/// /sessions/{id}/annotations/{image_id}          get, save (PUT), delete
/// /sessions/{id}/quick-action                    label current image (POST)
/// /sessions/{id}/cursor                          current position (GET)
/// /sessions/{id}/cursor/move                     relative move (POST)
/// /sessions/{id}/cursor/jump                     absolute jump (POST)
/// /sessions/{id}/cursor/next-unannotated         skip ahead (POST)
/// /sessions/{id}/unannotated                     unlabelled image ids (GET)
/// /sessions/{id}/stats                           statistics report (GET)
/// /sessions/{id}/progress                        progress only (GET)
/// /sessions/{id}/export.csv                      CSV download (GET)
/// /sessions/{id}/import                          CSV upload (POST)
/// /sessions/{id}/bulk                            bulk label (POST)
/// /sessions/{id}/images/{image_id}               image bytes or redirect (GET)
/// /sessions/{id}/ws                              change feed WebSocket
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sessions", session::router())
}
