//! `/jemaat`: congregant directory.

use axum::{
    Router,
    routing::get,
};
use util::state::AppState;

mod common;
mod get;
mod post;

pub use common::{CreateJemaatRequest, JemaatResponse, SearchQuery};
pub use get::search_jemaat;
pub use post::create_jemaat;

pub fn jemaat_routes() -> Router<AppState> {
    Router::new().route("/", get(search_jemaat).post(create_jemaat))
}
