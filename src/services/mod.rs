pub mod analyzer;
pub mod document;
pub mod extraction;
pub mod upload;

pub use analyzer::{DocumentAnalyzer, FixtureAnalyzer, TextractAnalyzer};
pub use document::{Block, BlockKind, Document};
pub use extraction::{extract_document, flatten, ExtractedDocument};
pub use upload::{allowed_file, secure_filename, StagedUpload};
