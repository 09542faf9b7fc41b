//! Scan client for QR attendance check-in.
//!
//! The operator picks a jemaat ([`identity`]), the camera decodes a session's
//! QR payload and [`flow::ScanFlow`] submits it once through a
//! [`api::KehadiranApi`], then parks in a success or error state until the
//! operator re-arms it.

pub mod api;
pub mod camera;
pub mod config;
pub mod flow;
pub mod identity;

pub use api::{
    ApiError, FALLBACK_ERROR_MESSAGE, HttpKehadiranApi, JemaatSummary, KehadiranApi, ScanRequest,
};
pub use camera::{Camera, CameraError, CameraLease};
pub use config::ScannerConfig;
pub use flow::{PendingScan, ScanFlow, ScanState};
pub use identity::{IdentitySelector, MIN_QUERY_CHARS, SearchOutcome};
