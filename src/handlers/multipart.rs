use axum::extract::{multipart::MultipartError, Multipart};
use axum::http::StatusCode;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::UploadedFile;

pub const FILE_FIELD: &str = "file";

/// Reads the `file` field out of a multipart form. Returns `None` when the form
/// has no such field. A field without a file name yields an empty name, which
/// the upload validator rejects.
pub async fn read_file_field(
    multipart: &mut Multipart,
    limit_mb: usize,
) -> AppResult<Option<UploadedFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit_mb, "Failed to read multipart field"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit_mb, "Failed to read file data"))?;

        let mut file = UploadedFile::new(file_name, data);
        if let Some(mime_type) = content_type {
            file = file.with_mime_type(mime_type);
        }

        debug!(
            "Extracted file: {} ({} bytes, type: {:?})",
            file.name,
            file.size,
            file.mime_type
        );

        return Ok(Some(file));
    }

    Ok(None)
}

/// Body-limit rejections surface as `FileTooLarge`; anything else is a
/// malformed upload.
fn multipart_error(err: MultipartError, limit_mb: usize, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(limit_mb = limit_mb, "Upload exceeds body limit");
        return AppError::FileTooLarge { limit: limit_mb };
    }
    AppError::invalid_file(format!("{}: {}", context, err.body_text()))
}
