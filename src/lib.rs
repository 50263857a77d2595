//! Docscan Document Extraction Service
//!
//! Accepts uploaded PDFs and images, sends them to Amazon Textract for OCR and
//! table detection, and renders the extracted text and tables.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod views;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
