//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness probe
//! - `/jemaat` → congregant directory (search, create)
//! - `/kehadiran` → QR sessions, scan recording, attendance records

use crate::routes::{health::health_routes, jemaat::jemaat_routes, kehadiran::kehadiran_routes};
use axum::Router;
use util::state::AppState;

pub mod health;
pub mod jemaat;
pub mod kehadiran;

/// Builds the `/api` router.
///
/// The returned router already carries `app_state`; nest it under `/api`.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/jemaat", jemaat_routes())
        .nest("/kehadiran", kehadiran_routes())
        .with_state(app_state)
}
