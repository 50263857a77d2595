use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::models::DownloadQuery;

pub const DOWNLOAD_FILE_NAME: &str = "extracted_text.txt";
pub const NO_TEXT_MESSAGE: &str = "Error: No extracted text available to download.";

/// Returns the `text` query parameter as a plain-text attachment. The body is
/// built per request; nothing is written to disk.
pub async fn download_text_handler(Query(query): Query<DownloadQuery>) -> Response {
    let Some(text) = query.text() else {
        warn!("Download requested without text");
        return NO_TEXT_MESSAGE.into_response();
    };

    info!(text_length = text.len(), "Serving extracted text download");

    let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME);
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        text.to_string(),
    )
        .into_response()
}
