use axum::{
    extract::{Multipart, State},
    response::Json,
};
use std::time::Instant;
use tracing::{info, warn, error};

use crate::error::{AppError, AppResult};
use crate::handlers::multipart::read_file_field;
use crate::middleware::current_request_id;
use crate::models::ExtractResponse;
use crate::services::{allowed_file, extract_document};
use crate::state::AppState;

/// JSON variant of `/process`.
pub async fn extract_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ExtractResponse>> {
    let start = Instant::now();
    let request_id = current_request_id();

    info!(request_id = %request_id, "Starting extraction request");

    let file = read_file_field(&mut multipart, state.config.max_file_size_mb)
        .await?
        .ok_or_else(|| {
            warn!(request_id = %request_id, "No file field in request");
            AppError::MissingFile
        })?;

    if file.name.is_empty() || !allowed_file(&file.name, &state.config.allowed_extensions) {
        warn!(request_id = %request_id, file_name = %file.name, "Rejected upload");
        return Err(AppError::invalid_file(format!(
            "'{}' does not have an allowed extension",
            file.name
        )));
    }

    let analyzer = state.analyzer.as_ref();
    let extracted = match extract_document(&state.config.upload_dir, analyzer, &file).await {
        Ok(extracted) => extracted,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Extraction failed");
            return Err(e);
        }
    };

    let total_time = start.elapsed().as_millis() as u64;

    info!(
        request_id = %request_id,
        total_time_ms = total_time,
        "Request completed successfully"
    );

    Ok(Json(ExtractResponse::new(
        extracted.text,
        extracted.tables,
        extracted.pages,
        total_time,
    )))
}
