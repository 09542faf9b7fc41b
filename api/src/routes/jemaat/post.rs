use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use db::models::jemaat::Model as Jemaat;
use sea_orm::SqlErr;
use util::state::AppState;
use validator::Validate;

use super::common::{CreateJemaatRequest, JemaatResponse};
use crate::response::ApiResponse;

/// POST `/api/jemaat`
///
/// ### Request Body
/// ```json
/// { "nama": "Andi Pratama", "nomorInduk": "GM-001", "fotoUrl": "https://..." }
/// ```
///
/// ### Responses
/// - `201 Created` with the new jemaat
/// - `400 Bad Request` on validation failure
/// - `409 Conflict` when `nomorInduk` is already taken
pub async fn create_jemaat(
    State(state): State<AppState>,
    Json(req): Json<CreateJemaatRequest>,
) -> (StatusCode, Json<ApiResponse<Option<JemaatResponse>>>) {
    let req = CreateJemaatRequest {
        nama: req.nama.trim().to_string(),
        nomor_induk: req.nomor_induk.trim().to_string(),
        foto_url: req.foto_url.filter(|u| !u.trim().is_empty()),
    };

    if let Err(validation_errors) = req.validate() {
        let error_message = common::format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(error_message)),
        );
    }

    match Jemaat::create(state.db(), &req.nama, &req.nomor_induk, req.foto_url.as_deref()).await {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(JemaatResponse::from(row)),
                "Jemaat berhasil ditambahkan",
            )),
        ),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Nomor induk sudah digunakan")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to create jemaat");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Gagal menambahkan jemaat")),
            )
        }
    }
}
