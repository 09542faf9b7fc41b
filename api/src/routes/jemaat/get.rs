use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use db::models::jemaat::Model as Jemaat;
use util::{config, state::AppState};

use super::common::{JemaatResponse, SearchQuery};
use crate::response::ApiResponse;

/// GET `/api/jemaat?search={q}&limit={n}`
///
/// Searches the directory by name or membership number. A missing `search`
/// or one shorter than three characters yields an empty list; the scan client
/// never sends those, but other callers might.
///
/// **Query**:
/// - `search`: free text, matched case-insensitively
/// - `limit` *(optional)*: capped at `SEARCH_RESULT_LIMIT`
///
/// **Response**: array of `{ id, nama, nomorInduk, fotoUrl? }`
pub async fn search_jemaat(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<JemaatResponse>>>) {
    let max = config::search_result_limit();
    let limit = q.limit.unwrap_or(max).clamp(1, max);
    let needle = q.search.unwrap_or_default();

    match Jemaat::search(state.db(), &needle, limit).await {
        Ok(rows) => {
            let data: Vec<JemaatResponse> = rows.into_iter().map(JemaatResponse::from).collect();
            let message = format!("{} jemaat ditemukan", data.len());
            (StatusCode::OK, Json(ApiResponse::success(data, message)))
        }
        Err(e) => {
            tracing::error!(error = %e, "jemaat search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Gagal mencari data jemaat")),
            )
        }
    }
}
