use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use db::models::attendance_record::{Model as Record, ScanError};
use db::models::attendance_session::{Model as Session, NewSession};
use sea_orm::DbErr;
use util::state::AppState;
use validator::Validate;

use super::common::{
    CreateSessionReq, ScanRequest, ScanResult, SessionResponse, iso, scan_error_status,
};
use crate::{extractors::ClientIp, response::ApiResponse};

/// POST `/api/kehadiran/sessions`
///
/// Issues a new QR session. The QR payload (`kodeQr`) is generated server-side.
///
/// ### Request Body
/// ```json
/// {
///   "namaKegiatan": "Ibadah Minggu",
///   "jenisKegiatan": "Ibadah",
///   "tanggal": "2025-10-19",
///   "waktuMulai": "2025-10-19T08:00:00Z",
///   "waktuSelesai": "2025-10-19T10:00:00Z",
///   "statusAktif": true
/// }
/// ```
///
/// ### Responses
/// - `201 Created` with the session
/// - `400 Bad Request` on validation failure (including an inverted window)
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionReq>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    if let Err(validation_errors) = body.validate() {
        let error_message = common::format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(error_message)),
        );
    }

    let new = NewSession {
        nama_kegiatan: body.nama_kegiatan.trim().to_string(),
        jenis_kegiatan: body.jenis_kegiatan.trim().to_string(),
        tanggal: body.tanggal.unwrap_or_else(|| body.waktu_mulai.date_naive()),
        waktu_mulai: body.waktu_mulai,
        waktu_selesai: body.waktu_selesai,
        status_aktif: body.status_aktif.unwrap_or(true),
        kode_qr: None,
    };

    match Session::create(state.db(), new).await {
        Ok(row) => {
            tracing::info!(session_id = %row.id, nama_kegiatan = %row.nama_kegiatan, "attendance session issued");
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    SessionResponse::from(row),
                    "Sesi kehadiran berhasil dibuat",
                )),
            )
        }
        Err(DbErr::Custom(m)) => (StatusCode::BAD_REQUEST, Json(ApiResponse::error(m))),
        Err(e) => {
            tracing::error!(error = %e, "failed to create attendance session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Gagal membuat sesi kehadiran")),
            )
        }
    }
}

/// POST `/api/kehadiran/scan`
///
/// Records attendance for the selected jemaat at the session whose QR payload
/// was decoded.
///
/// ### Request Body
/// ```json
/// { "kodeQr": "SESSION-42-ABC", "jemaatId": "p1" }
/// ```
///
/// ### Responses
/// - `200 OK` : `"Kehadiran berhasil dicatat"`
/// - `400 Bad Request` : missing fields, or session inactive / not started / ended
/// - `404 Not Found` : unknown QR code or jemaat
/// - `409 Conflict` : already recorded for this session
/// - `500 Internal Server Error`
///
/// The `message` of every failure is meant to be shown verbatim to the operator.
pub async fn scan(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<ScanRequest>,
) -> (StatusCode, Json<ApiResponse<Option<ScanResult>>>) {
    if let Err(validation_errors) = body.validate() {
        let error_message = common::format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(error_message)),
        );
    }

    let db = state.db();
    let now = Utc::now();

    match Record::record_scan(db, &body.kode_qr, body.jemaat_id.trim(), now, ip.as_deref()).await {
        Ok(rec) => {
            let nama_kegiatan = Session::find(db, &rec.session_id)
                .await
                .inspect_err(|e| {
                    tracing::warn!(error = %e, session_id = %rec.session_id, "failed to load session name");
                })
                .ok()
                .flatten()
                .map(|s| s.nama_kegiatan)
                .unwrap_or_default();
            let result = ScanResult {
                session_id: rec.session_id,
                nama_kegiatan,
                jemaat_id: rec.jemaat_id,
                waktu_hadir: iso(rec.waktu_hadir),
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(Some(result), "Kehadiran berhasil dicatat")),
            )
        }
        Err(ScanError::Db(e)) => {
            tracing::error!(error = %e, "failed to record attendance");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Gagal mencatat kehadiran")),
            )
        }
        Err(rejection) => {
            tracing::info!(reason = %rejection, jemaat_id = %body.jemaat_id, "scan refused");
            (
                scan_error_status(&rejection),
                Json(ApiResponse::error(rejection.to_string())),
            )
        }
    }
}
