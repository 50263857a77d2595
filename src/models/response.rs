use serde::{Deserialize, Serialize};

/// Rows of cell text, in the order the provider returned them.
pub type ExtractedTable = Vec<Vec<String>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub data: ExtractData,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractData {
    pub text: String,
    pub tables: Vec<ExtractedTable>,
    pub pages: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub uptime_seconds: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ExtractResponse {
    pub fn new(
        text: String,
        tables: Vec<ExtractedTable>,
        pages: usize,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            success: true,
            data: ExtractData {
                text,
                tables,
                pages,
            },
            processing_time_ms,
        }
    }
}
