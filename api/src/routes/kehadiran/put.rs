use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use db::models::attendance_session::{Model as Session, SessionChanges};
use sea_orm::DbErr;
use util::state::AppState;
use validator::Validate;

use super::common::{EditSessionReq, SessionResponse};
use crate::response::ApiResponse;

/// PUT `/api/kehadiran/sessions/{session_id}`
///
/// Partial update: omitted fields are left as they are. The QR payload never
/// changes. Deactivate a session with `"statusAktif": false`; sessions are not
/// deleted.
///
/// ### Responses
/// - `200 OK` with the updated session
/// - `400 Bad Request` on validation failure or an inverted window
/// - `404 Not Found`
pub async fn edit_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<EditSessionReq>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    if let Err(validation_errors) = body.validate() {
        let error_message = common::format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(error_message)),
        );
    }

    let changes = SessionChanges {
        nama_kegiatan: body.nama_kegiatan.map(|s| s.trim().to_string()),
        jenis_kegiatan: body.jenis_kegiatan.map(|s| s.trim().to_string()),
        tanggal: body.tanggal,
        waktu_mulai: body.waktu_mulai,
        waktu_selesai: body.waktu_selesai,
        status_aktif: body.status_aktif,
    };

    let db = state.db();
    match Session::edit(db, &session_id, changes).await {
        Ok(updated) => {
            // the edit is already committed, so a failed count only blanks the figure
            let hadir = match Session::attended_count(db, &updated.id).await {
                Ok(n) => n as i64,
                Err(e) => {
                    tracing::warn!(error = %e, session_id = %session_id, "failed to count attendance");
                    0
                }
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    SessionResponse::with_count(updated, hadir),
                    "Sesi kehadiran diperbarui",
                )),
            )
        }
        Err(DbErr::RecordNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Sesi kehadiran tidak ditemukan")),
        ),
        Err(DbErr::Custom(m)) => (StatusCode::BAD_REQUEST, Json(ApiResponse::error(m))),
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to update attendance session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Gagal memperbarui sesi kehadiran")),
            )
        }
    }
}
