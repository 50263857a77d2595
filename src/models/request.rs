use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Query string accepted by `GET /download_text`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DownloadQuery {
    pub text: Option<String>,
}

impl DownloadQuery {
    /// The text to download, if present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}

/// A file received through the `file` multipart field.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: usize,
    pub content: Bytes,
    pub mime_type: Option<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let size = content.len();
        Self {
            name: name.into(),
            size,
            content,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: String) -> Self {
        self.mime_type = Some(mime_type);
        self
    }
}
