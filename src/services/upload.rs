//! Upload validation and the on-disk lifecycle of a staged upload.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::UploadedFile;

/// Returns true when `filename` has a `.`-delimited suffix contained in
/// `allowed`. The comparison ignores case; `allowed` holds lower-case entries.
pub fn allowed_file(filename: &str, allowed: &HashSet<String>) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => allowed.contains(&ext.to_lowercase()),
        None => false,
    }
}

/// Reduces a client supplied file name to a safe, flat ASCII name. Accented
/// letters are decomposed first so `über.pdf` keeps its base letter.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// An upload written to the upload directory for the duration of one request.
///
/// The file is deleted exactly once: by [`StagedUpload::remove`], or on drop
/// if the request bailed out before reaching it.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    removed: bool,
}

impl StagedUpload {
    pub async fn persist(upload_dir: &Path, file: &UploadedFile) -> AppResult<Self> {
        tokio::fs::create_dir_all(upload_dir).await?;

        let name = format!("{}_{}", Uuid::new_v4().simple(), secure_filename(&file.name));
        let path = upload_dir.join(name);

        tokio::fs::write(&path, &file.content).await?;
        debug!(path = %path.display(), bytes = file.size, "Upload staged");

        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> AppResult<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    pub async fn remove(mut self) -> AppResult<()> {
        self.removed = true;
        tokio::fs::remove_file(&self.path).await?;
        debug!(path = %self.path.display(), "Staged upload removed");
        Ok(())
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload");
        }
    }
}
