//! HTTP-level integration tests for session lifecycle endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with, create_loaded_session, delete, get,
    post_json, put_json, test_config,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: POST /sessions with no body creates an empty session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_empty_session() {
    let app = build_test_app();
    let response = common::send(
        app.clone(),
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/v1/sessions")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["image_count"], 0);
    assert!(json["data"]["cursor"].is_null());
    assert_eq!(json["data"]["revision"], 0);
    assert_eq!(json["data"]["progress"]["percent"], 0.0);
}

// ---------------------------------------------------------------------------
// Test: create with a load positions the cursor on the first image
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_loaded_session_starts_at_first_image() {
    let app = build_test_app();
    let id = create_loaded_session(&app, &["a.jpg", "b.jpg", "c.jpg"], "  batch1 ").await;

    let json = body_json(get(app, &format!("/api/v1/sessions/{id}")).await).await;
    assert_eq!(json["data"]["image_count"], 3);
    assert_eq!(json["data"]["cursor"], 0);
    assert_eq!(json["data"]["current_image"], "a.jpg");
    assert_eq!(json["data"]["source_label"], "batch1");
}

// ---------------------------------------------------------------------------
// Test: malformed create body is a 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_with_bad_body_returns_400() {
    let app = build_test_app();
    let response = post_json(app, "/api/v1/sessions", json!({ "load": { "source": "ftp" } })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: GET /sessions lists every open session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_sessions() {
    let app = build_test_app();
    let a = create_loaded_session(&app, &["a.jpg"], "x").await;
    let b = create_loaded_session(&app, &["b.jpg"], "y").await;

    let json = body_json(get(app, "/api/v1/sessions").await).await;
    let ids: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.as_str()));
    assert!(ids.contains(&b.as_str()));
}

// ---------------------------------------------------------------------------
// Test: unknown and malformed session ids
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_session_returns_404() {
    let app = build_test_app();
    let response = get(
        app.clone(),
        "/api/v1/sessions/00000000-0000-0000-0000-000000000000",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = get(app, "/api/v1/sessions/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: DELETE /sessions/{id} removes the session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_session() {
    let app = build_test_app();
    let id = create_loaded_session(&app, &["a.jpg"], "x").await;
    let uri = format!("/api/v1/sessions/{id}");

    let response = delete(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(get(app.clone(), &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete(app, &uri).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: session limit is enforced
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_limit_returns_503() {
    let mut config = test_config();
    config.max_sessions = 1;
    let app = build_test_app_with(config);

    create_loaded_session(&app, &["a.jpg"], "x").await;
    let response = post_json(app, "/api/v1/sessions", json!({})).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "TOO_MANY_SESSIONS");
}

// ---------------------------------------------------------------------------
// Test: two sessions never see each other's annotations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sessions_are_isolated() {
    let app = build_test_app();
    let a = create_loaded_session(&app, &["shared.jpg"], "first").await;
    let b = create_loaded_session(&app, &["shared.jpg"], "second").await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/sessions/{a}/annotations/shared.jpg"),
        json!({ "validity": "Valid", "gender": "F", "category": "Top" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        app.clone(),
        &format!("/api/v1/sessions/{b}/annotations/shared.jpg"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get(app, &format!("/api/v1/sessions/{b}/annotations")).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: loading a new image set discards annotations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_replaces_images_and_clears_annotations() {
    let app = build_test_app();
    let id = create_loaded_session(&app, &["a.jpg", "b.jpg"], "old").await;
    put_json(
        app.clone(),
        &format!("/api/v1/sessions/{id}/annotations/a.jpg"),
        json!({ "validity": "Valid", "gender": "M", "category": "Top" }),
    )
    .await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/sessions/{id}/load"),
        json!({
            "source": "file_list",
            "text": "  x.png\nnotes.txt\ny<1>.jpg\n\n",
            "source_label": "new"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["image_count"], 2);
    assert_eq!(json["data"]["current_image"], "x.png");
    assert_eq!(json["data"]["source_label"], "new");
    assert_eq!(json["data"]["change"]["kind"]["type"], "loaded");
    assert_eq!(json["data"]["change"]["kind"]["images"], 2);

    let json = body_json(get(app, &format!("/api/v1/sessions/{id}/annotations")).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: directory loads need a configured image directory
// ---------------------------------------------------------------------------

#[tokio::test]
async fn directory_load_without_config_returns_400() {
    let app = build_test_app();
    let id = create_loaded_session(&app, &[], "").await;

    let response = post_json(
        app,
        &format!("/api/v1/sessions/{id}/load"),
        json!({ "source": "directory" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn directory_load_lists_image_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.jpg"), b"b").unwrap();
    std::fs::write(dir.path().join("a.png"), b"a").unwrap();
    std::fs::write(dir.path().join("readme.md"), b"-").unwrap();

    let mut config = test_config();
    config.image_dir = Some(dir.path().to_path_buf());
    let app = build_test_app_with(config);
    let id = create_loaded_session(&app, &[], "").await;

    let response = post_json(
        app,
        &format!("/api/v1/sessions/{id}/load"),
        json!({ "source": "directory", "source_label": "shoot" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["image_count"], 2);
    assert_eq!(json["data"]["current_image"], "a.png");
}

// ---------------------------------------------------------------------------
// Test: reset clears everything
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_clears_session() {
    let app = build_test_app();
    let id = create_loaded_session(&app, &["a.jpg"], "label").await;

    let response = post_json(app, &format!("/api/v1/sessions/{id}/reset"), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["image_count"], 0);
    assert!(json["data"]["cursor"].is_null());
    assert_eq!(json["data"]["source_label"], "");
    assert_eq!(json["data"]["change"]["kind"]["type"], "reset");
}
