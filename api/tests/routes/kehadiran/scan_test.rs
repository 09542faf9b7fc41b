use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::models::attendance_session::Model as SessionModel;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::helpers::{body_json, make_test_app, seed_jemaat, seed_session};

async fn post_scan(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/kehadiran/scan")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-forwarded-for", "198.51.100.20")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn valid_scan_is_recorded_once() {
    let (app, db) = make_test_app().await;
    let andi = seed_jemaat(&db, "Andi Pratama", "GM-001").await;
    let session = seed_session(&db, "SESSION-42-ABC", true).await;

    let (status, json) = post_scan(
        &app,
        json!({ "kodeQr": "SESSION-42-ABC", "jemaatId": andi.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Kehadiran berhasil dicatat");
    assert_eq!(json["data"]["sessionId"], session.id);
    assert_eq!(json["data"]["namaKegiatan"], "Ibadah Minggu");

    let (status, json) = post_scan(
        &app,
        json!({ "kodeQr": "SESSION-42-ABC", "jemaatId": andi.id }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Kehadiran sudah tercatat untuk sesi ini");

    assert_eq!(SessionModel::attended_count(&db, &session.id).await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_code_and_jemaat_are_not_found() {
    let (app, db) = make_test_app().await;
    let andi = seed_jemaat(&db, "Andi Pratama", "GM-001").await;
    seed_session(&db, "SESSION-42-ABC", true).await;

    let (status, json) =
        post_scan(&app, json!({ "kodeQr": "SESSION-99", "jemaatId": andi.id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "QR Code tidak valid atau sudah kedaluwarsa");

    let (status, json) =
        post_scan(&app, json!({ "kodeQr": "SESSION-42-ABC", "jemaatId": "ghost" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Jemaat tidak ditemukan");
}

#[tokio::test]
async fn inactive_session_is_refused_with_message() {
    let (app, db) = make_test_app().await;
    let andi = seed_jemaat(&db, "Andi Pratama", "GM-001").await;
    seed_session(&db, "SESSION-42-ABC", false).await;

    let (status, json) = post_scan(
        &app,
        json!({ "kodeQr": "SESSION-42-ABC", "jemaatId": andi.id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Sesi kehadiran tidak aktif");
}

#[tokio::test]
async fn empty_fields_fail_validation() {
    let (app, _db) = make_test_app().await;

    let (status, json) = post_scan(&app, json!({ "kodeQr": "", "jemaatId": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("QR Code wajib diisi"));
    assert!(message.contains("Jemaat wajib dipilih"));
}

#[tokio::test]
async fn forwarded_ip_is_stored_on_the_record() {
    let (app, db) = make_test_app().await;
    let andi = seed_jemaat(&db, "Andi Pratama", "GM-001").await;
    let session = seed_session(&db, "SESSION-42-ABC", true).await;

    post_scan(&app, json!({ "kodeQr": "SESSION-42-ABC", "jemaatId": andi.id })).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/kehadiran/sessions/{}/records", session.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["records"][0]["ipAddress"], "198.51.100.20");
    assert_eq!(json["data"]["records"][0]["nama"], "Andi Pratama");
}
