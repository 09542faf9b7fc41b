//! Read-only kehadiran routes: list sessions, fetch one session, list its
//! records, export its records as CSV.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use db::models::attendance_record::{self, RecordQuery};
use db::models::attendance_session::{
    Column as SessionCol, Entity as SessionEntity, Model as Session,
};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use util::state::AppState;

use super::common::{
    ListQuery, ListResponse, RecordDto, RecordsListQuery, RecordsListResponse, SessionResponse,
    iso,
};
use crate::response::ApiResponse;

/// GET `/api/kehadiran/sessions`
///
/// **Query**:
/// - `q` *(optional)*: matches activity name or kind
/// - `aktif` *(optional bool)*
/// - `sort` *(optional)*: `waktu_mulai` | `nama_kegiatan` | `created_at` (prefix `-` for desc)
/// - `page` *(default 1)*
/// - `per_page` *(default 20, max 100)*
///
/// **Response**: `ListResponse` with `jumlahHadir` per session.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<ListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1);
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100);

    let mut sel = SessionEntity::find();
    if let Some(s) = q.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sel = sel.filter(
            Condition::any()
                .add(SessionCol::NamaKegiatan.contains(s))
                .add(SessionCol::JenisKegiatan.contains(s)),
        );
    }
    if let Some(a) = q.aktif {
        sel = sel.filter(SessionCol::StatusAktif.eq(a));
    }
    sel = match q.sort.as_deref() {
        Some(sort) if sort.starts_with('-') => match &sort[1..] {
            "nama_kegiatan" => sel.order_by_desc(SessionCol::NamaKegiatan),
            "created_at" => sel.order_by_desc(SessionCol::CreatedAt),
            _ => sel.order_by_desc(SessionCol::WaktuMulai),
        },
        Some("waktu_mulai") => sel.order_by_asc(SessionCol::WaktuMulai),
        Some("nama_kegiatan") => sel.order_by_asc(SessionCol::NamaKegiatan),
        Some("created_at") => sel.order_by_asc(SessionCol::CreatedAt),
        _ => sel.order_by_desc(SessionCol::WaktuMulai),
    };

    let paginator = sel.paginate(db, per_page);
    let (total, rows) = match paginator.num_items().await {
        Ok(total) => match paginator.fetch_page(page - 1).await {
            Ok(rows) => (total, rows),
            Err(e) => return list_failed(e),
        },
        Err(e) => return list_failed(e),
    };

    let ids: Vec<String> = rows.iter().map(|s| s.id.clone()).collect();
    let counts = match Session::attended_counts_for(db, &ids).await {
        Ok(counts) => counts,
        Err(e) => return list_failed(e),
    };

    let resp = ListResponse {
        sessions: rows
            .into_iter()
            .map(|s| {
                let hadir = counts.get(&s.id).copied().unwrap_or(0);
                SessionResponse::with_count(s, hadir)
            })
            .collect(),
        page,
        per_page,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Daftar sesi kehadiran")),
    )
}

fn list_failed(e: sea_orm::DbErr) -> (StatusCode, Json<ApiResponse<ListResponse>>) {
    tracing::error!(error = %e, "failed to list attendance sessions");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("Gagal memuat sesi kehadiran")),
    )
}

/// GET `/api/kehadiran/sessions/{session_id}`
///
/// **Response**: `SessionResponse` including `kodeQr` and `jumlahHadir`.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    let db = state.db();

    match Session::find(db, &session_id).await {
        Ok(Some(row)) => match Session::attended_count(db, &row.id).await {
            Ok(hadir) => (
                StatusCode::OK,
                Json(ApiResponse::success(
                    SessionResponse::with_count(row, hadir as i64),
                    "Sesi kehadiran ditemukan",
                )),
            ),
            Err(e) => {
                tracing::error!(error = %e, session_id = %session_id, "failed to count attendance");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Gagal memuat sesi kehadiran")),
                )
            }
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Sesi kehadiran tidak ditemukan")),
        ),
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to load attendance session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Gagal memuat sesi kehadiran")),
            )
        }
    }
}

/// GET `/api/kehadiran/sessions/{session_id}/records`
///
/// **Query**:
/// - `q` *(optional)*: matches jemaat name, membership number or IP address
/// - `sort` *(optional)*: `waktu_hadir` | `nama` (prefix `-` for desc). Default `-waktu_hadir`.
/// - `page` *(default 1)*
/// - `per_page` *(default 20, max 200)*
pub async fn list_session_records(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(q): Query<RecordsListQuery>,
) -> (StatusCode, Json<ApiResponse<RecordsListResponse>>) {
    let db = state.db();

    match Session::find(db, &session_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Sesi kehadiran tidak ditemukan")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to load attendance session");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Gagal memuat data kehadiran")),
            );
        }
    }

    let query = RecordQuery {
        q: q.q,
        sort: q.sort,
        page: q.page.unwrap_or(1).max(1),
        per_page: q.per_page.unwrap_or(20).clamp(1, 200),
    };

    match attendance_record::Model::list_for_session(db, &session_id, &query).await {
        Ok((rows, total)) => {
            let resp = RecordsListResponse {
                records: rows.into_iter().map(RecordDto::from).collect(),
                page: query.page,
                per_page: query.per_page,
                total,
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(resp, "Data kehadiran")),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to list attendance records");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Gagal memuat data kehadiran")),
            )
        }
    }
}

/// GET `/api/kehadiran/sessions/{session_id}/records/export`
///
/// **Response**: `text/csv` attachment with columns
/// `session_id,jemaat_id,nama,nomor_induk,waktu_hadir,ip_address`
pub async fn export_session_records_csv(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> (StatusCode, (HeaderMap, String)) {
    let db = state.db();

    match Session::find(db, &session_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return plain_text(StatusCode::NOT_FOUND, "Sesi kehadiran tidak ditemukan");
        }
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to load attendance session");
            return plain_text(StatusCode::INTERNAL_SERVER_ERROR, "error");
        }
    }

    let records = match attendance_record::Model::all_for_session(db, &session_id).await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, session_id = %session_id, "failed to export attendance records");
            return plain_text(StatusCode::INTERNAL_SERVER_ERROR, "error");
        }
    };

    let mut csv = String::from("session_id,jemaat_id,nama,nomor_induk,waktu_hadir,ip_address\n");
    for r in records {
        let (nama, nomor_induk) = r
            .jemaat
            .as_ref()
            .map(|j| (j.nama.as_str(), j.nomor_induk.as_str()))
            .unwrap_or(("", ""));
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            esc(&r.record.session_id),
            esc(&r.record.jemaat_id),
            esc(nama),
            esc(nomor_induk),
            iso(r.record.waktu_hadir),
            esc(r.record.ip_address.as_deref().unwrap_or_default()),
        ));
    }

    let filename = format!("kehadiran_{}.csv", session_id);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    (StatusCode::OK, (headers, csv))
}

fn plain_text(status: StatusCode, body: &str) -> (StatusCode, (HeaderMap, String)) {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    (status, (headers, body.to_string()))
}

fn esc(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
