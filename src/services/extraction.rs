use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::{ExtractedTable, UploadedFile};
use crate::services::analyzer::DocumentAnalyzer;
use crate::services::document::Document;
use crate::services::upload::StagedUpload;

/// Text and tables flattened out of an analysed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedDocument {
    pub text: String,
    pub tables: Vec<ExtractedTable>,
    pub pages: usize,
}

/// Walks pages in order, appending each page's text plus a line break and
/// collecting every table as rows of cell text.
pub fn flatten(document: &Document) -> ExtractedDocument {
    let mut text = String::new();
    let mut tables = Vec::with_capacity(document.table_count());

    for page in &document.pages {
        if !page.text.is_empty() {
            text.push_str(&page.text);
            text.push('\n');
        }

        for table in &page.tables {
            let rows: ExtractedTable = table
                .rows
                .iter()
                .map(|row| row.cells.iter().map(|cell| cell.text.clone()).collect())
                .collect();
            tables.push(rows);
        }
    }

    ExtractedDocument {
        text,
        tables,
        pages: document.pages.len(),
    }
}

/// Stages `file` under `upload_dir`, sends it to `analyzer` and flattens the
/// result. The staged file is gone by the time this returns, whether the
/// analysis succeeded or not.
pub async fn extract_document(
    upload_dir: &Path,
    analyzer: &dyn DocumentAnalyzer,
    file: &UploadedFile,
) -> AppResult<ExtractedDocument> {
    let start = Instant::now();

    let staged = StagedUpload::persist(upload_dir, file).await?;
    let content = staged.read().await?;

    let analysis = analyzer.analyze(&content).await;
    staged.remove().await?;
    let blocks = analysis?;

    debug!(blocks = blocks.len(), analyzer = analyzer.name(), "Analysis returned");

    let document = Document::from_blocks(&blocks);
    let extracted = flatten(&document);

    info!(
        file_name = %file.name,
        pages = extracted.pages,
        tables = extracted.tables.len(),
        text_length = extracted.text.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Document extraction completed"
    );

    Ok(extracted)
}
