use axum::response::Json;
use once_cell::sync::Lazy;
use std::time::Instant;
use tracing::debug;

use crate::models::HealthResponse;

static STARTED_AT: Lazy<Instant> = Lazy::new(Instant::now);

pub(crate) fn mark_started() {
    Lazy::force(&STARTED_AT);
}

/// Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    let uptime = STARTED_AT.elapsed().as_secs();
    debug!(uptime_seconds = uptime, "Health check requested");

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        uptime_seconds: Some(uptime),
    })
}
