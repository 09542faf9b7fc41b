use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, SecondsFormat, Utc};
use db::models::attendance_record::Model as RecordModel;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::helpers::{body_json, make_test_app, seed_jemaat, seed_session};

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

fn ts(offset_minutes: i64) -> String {
    (Utc::now() + Duration::minutes(offset_minutes)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[tokio::test]
async fn create_session_issues_a_qr_code() {
    let (app, _db) = make_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/kehadiran/sessions",
        Some(json!({
            "namaKegiatan": "Persekutuan Pemuda",
            "jenisKegiatan": "Persekutuan",
            "waktuMulai": ts(-10),
            "waktuSelesai": ts(60),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &json["data"];
    assert_eq!(data["namaKegiatan"], "Persekutuan Pemuda");
    assert_eq!(data["statusAktif"], true);
    assert_eq!(data["sedangBerlangsung"], true);
    assert_eq!(data["kodeQr"].as_str().unwrap().len(), 64);
    assert_eq!(data["jumlahHadir"], 0);
}

#[tokio::test]
async fn create_session_rejects_inverted_window() {
    let (app, _db) = make_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/kehadiran/sessions",
        Some(json!({
            "namaKegiatan": "Ibadah",
            "jenisKegiatan": "Ibadah",
            "waktuMulai": ts(60),
            "waktuSelesai": ts(0),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Waktu selesai harus setelah waktu mulai");
}

#[tokio::test]
async fn get_and_edit_session() {
    let (app, db) = make_test_app().await;
    let session = seed_session(&db, "SESSION-42-ABC", true).await;
    let uri = format!("/api/kehadiran/sessions/{}", session.id);

    let (status, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["kodeQr"], "SESSION-42-ABC");

    let (status, json) = send(&app, "PUT", &uri, Some(json!({ "statusAktif": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["statusAktif"], false);
    assert_eq!(json["data"]["sedangBerlangsung"], false);
    assert_eq!(json["data"]["namaKegiatan"], "Ibadah Minggu");

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "waktuSelesai": ts(-24 * 60) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/kehadiran/sessions/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/kehadiran/sessions/missing",
        Some(json!({ "statusAktif": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_sessions_filters_and_counts() {
    let (app, db) = make_test_app().await;
    let open = seed_session(&db, "SESSION-1", true).await;
    seed_session(&db, "SESSION-2", false).await;
    let andi = seed_jemaat(&db, "Andi Pratama", "GM-001").await;
    RecordModel::record_scan(&db, "SESSION-1", &andi.id, Utc::now(), None)
        .await
        .unwrap();

    let (status, json) = send(&app, "GET", "/api/kehadiran/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 2);

    let (_, json) = send(&app, "GET", "/api/kehadiran/sessions?aktif=true", None).await;
    let sessions = json["data"]["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["id"], open.id);
    assert_eq!(sessions[0]["jumlahHadir"], 1);
}

#[tokio::test]
async fn records_export_as_csv() {
    let (app, db) = make_test_app().await;
    let session = seed_session(&db, "SESSION-42-ABC", true).await;
    let andi = seed_jemaat(&db, "Pratama, Andi", "GM-001").await;
    RecordModel::record_scan(&db, "SESSION-42-ABC", &andi.id, Utc::now(), Some("10.0.0.7"))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/kehadiran/sessions/{}/records/export", session.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("session_id,jemaat_id,nama,nomor_induk,waktu_hadir,ip_address")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with(&format!("{},{},\"Pratama, Andi\",GM-001,", session.id, andi.id)));
    assert!(row.ends_with(",10.0.0.7"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn records_of_unknown_session_are_not_found() {
    let (app, _db) = make_test_app().await;
    let (status, _) = send(&app, "GET", "/api/kehadiran/sessions/nope/records", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_of_unknown_session_is_not_found() {
    let (app, _db) = make_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/kehadiran/sessions/nope/records/export")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_ne!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
}
