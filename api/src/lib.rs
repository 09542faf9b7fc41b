pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::{
    Router,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::from_fn,
};
use tower_http::cors::CorsLayer;
use util::state::AppState;

/// The full application: `/api` routes, request logging and CORS.
pub fn app(app_state: AppState) -> Router {
    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_DISPOSITION, CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::routes(app_state.clone()))
        .layer(from_fn(middleware::log_request))
        .layer(cors)
        .with_state(app_state)
}
