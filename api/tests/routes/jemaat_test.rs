use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;
use tower::ServiceExt;

use crate::helpers::{body_json, make_test_app, seed_jemaat};

fn search(q: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/api/jemaat?search={q}"))
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn search_returns_matches_in_directory_shape() {
    let (app, db) = make_test_app().await;
    let andi = seed_jemaat(&db, "Andi Pratama", "GM-001").await;
    seed_jemaat(&db, "Budi Santoso", "GM-002").await;

    let response = app.oneshot(search("andi")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], andi.id);
    assert_eq!(data[0]["nama"], "Andi Pratama");
    assert_eq!(data[0]["nomorInduk"], "GM-001");
    assert!(data[0].get("fotoUrl").is_none());
}

#[tokio::test]
async fn short_or_missing_search_yields_empty_list() {
    let (app, db) = make_test_app().await;
    seed_jemaat(&db, "Andi Pratama", "GM-001").await;

    let response = app.clone().oneshot(search("an")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!([]));

    let bare = Request::builder()
        .uri("/api/jemaat")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(bare).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[tokio::test]
async fn create_jemaat_and_reject_duplicate_number() {
    let (app, _db) = make_test_app().await;

    let post = |body: serde_json::Value| {
        Request::builder()
            .uri("/api/jemaat")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(post(json!({ "nama": "Citra Lestari", "nomorInduk": "GM-003" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["nomorInduk"], "GM-003");

    let response = app
        .clone()
        .oneshot(post(json!({ "nama": "Citra L.", "nomorInduk": "GM-003" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(post(json!({ "nama": "   ", "nomorInduk": "GM-004" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}
