//! HTML pages rendered with askama. Templates live in `templates/`.

use askama::Template;
use axum::response::Html;

use crate::error::AppResult;
use crate::models::ExtractedTable;

pub const NO_FILE_MESSAGE: &str = "No file uploaded";
pub const INVALID_FILE_MESSAGE: &str = "Invalid file name or extension";

#[derive(Template, Debug, Default)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub message: Option<String>,
}

impl IndexPage {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

#[derive(Template, Debug)]
#[template(path = "result.html")]
pub struct ResultPage {
    pub extracted_text: String,
    pub tables: Vec<ExtractedTable>,
}

pub fn render<T: Template>(page: &T) -> AppResult<Html<String>> {
    Ok(Html(page.render()?))
}
