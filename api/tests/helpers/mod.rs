pub mod app;

pub use app::{body_json, make_test_app, seed_jemaat, seed_session};
