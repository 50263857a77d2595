pub mod download;
pub mod extract;
pub mod health;
pub mod multipart;
pub mod pages;

pub use download::*;
pub use extract::*;
pub use health::*;
pub use pages::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::logging_middleware;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    mark_started();

    let body_limit = state.config.max_body_bytes();

    Router::new()
        .route("/", get(home_handler))
        .route("/process", post(process_handler))
        .route("/download_text", get(download_text_handler))
        .route("/api/v1/extract", post(extract_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn(logging_middleware))
        )
        .with_state(state)
}
