use axum::{
    Router,
    body::{Body, to_bytes},
    response::Response,
};
use chrono::{Duration, Utc};
use db::models::{
    attendance_session::{Model as SessionModel, NewSession},
    jemaat::Model as JemaatModel,
};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use util::state::AppState;

/// Fresh in-memory database plus the full router on top of it.
pub async fn make_test_app() -> (Router, DatabaseConnection) {
    let db = setup_test_db().await;
    let app = api::app(AppState::new(db.clone()));
    (app, db)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn seed_jemaat(db: &DatabaseConnection, nama: &str, nomor_induk: &str) -> JemaatModel {
    JemaatModel::create(db, nama, nomor_induk, None).await.unwrap()
}

/// A session whose window is open for the next hour.
pub async fn seed_session(db: &DatabaseConnection, kode_qr: &str, aktif: bool) -> SessionModel {
    let now = Utc::now();
    SessionModel::create(
        db,
        NewSession {
            nama_kegiatan: "Ibadah Minggu".into(),
            jenis_kegiatan: "Ibadah".into(),
            tanggal: now.date_naive(),
            waktu_mulai: now - Duration::hours(1),
            waktu_selesai: now + Duration::hours(1),
            status_aktif: aktif,
            kode_qr: Some(kode_qr.into()),
        },
    )
    .await
    .unwrap()
}
