use super::{handlers, state::AppState};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Creates the Axum router.
///
/// Serverless platforms invoke the root path with any method, so `/` accepts
/// both `GET` and `POST`.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::run_job_handler).post(handlers::run_job_handler),
        )
        .route("/health", get(handlers::health_check))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
