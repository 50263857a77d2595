use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Html,
};
use tracing::{info, warn};

use crate::error::AppResult;
use crate::handlers::multipart::read_file_field;
use crate::middleware::current_request_id;
use crate::services::{allowed_file, extract_document};
use crate::state::AppState;
use crate::views::{self, IndexPage, ResultPage, INVALID_FILE_MESSAGE, NO_FILE_MESSAGE};

/// Upload form.
pub async fn home_handler() -> AppResult<Html<String>> {
    views::render(&IndexPage::default())
}

/// Form target: validates the upload, runs extraction and renders the results.
/// Validation failures re-render the form with an inline message.
pub async fn process_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Html<String>> {
    let request_id = current_request_id();
    let limit_mb = state.config.max_file_size_mb;

    let file = match multipart {
        Ok(mut multipart) => read_file_field(&mut multipart, limit_mb).await?,
        Err(rejection) => {
            warn!(
                request_id = %request_id,
                error = %rejection,
                "Request is not a multipart upload"
            );
            None
        }
    };

    let Some(file) = file else {
        warn!(request_id = %request_id, "No file field in upload");
        return views::render(&IndexPage::with_message(NO_FILE_MESSAGE));
    };

    if file.name.is_empty() || !allowed_file(&file.name, &state.config.allowed_extensions) {
        warn!(request_id = %request_id, file_name = %file.name, "Rejected upload");
        return views::render(&IndexPage::with_message(INVALID_FILE_MESSAGE));
    }

    info!(
        request_id = %request_id,
        file_name = %file.name,
        file_size = file.size,
        "Processing upload"
    );

    let extracted =
        extract_document(&state.config.upload_dir, state.analyzer.as_ref(), &file).await?;

    views::render(&ResultPage {
        extracted_text: extracted.text,
        tables: extracted.tables,
    })
}
