//! `/kehadiran`: QR sessions and the attendance recorder.

use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

mod common;
mod get;
mod post;
mod put;

pub use common::{
    CreateSessionReq, EditSessionReq, ListResponse, RecordDto, RecordsListResponse, ScanRequest,
    ScanResult, SessionResponse,
};
pub use get::{export_session_records_csv, get_session, list_session_records, list_sessions};
pub use post::{create_session, scan};
pub use put::edit_session;

pub fn kehadiran_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/{session_id}", get(get_session).put(edit_session))
        .route("/sessions/{session_id}/records", get(list_session_records))
        .route(
            "/sessions/{session_id}/records/export",
            get(export_session_records_csv),
        )
}
