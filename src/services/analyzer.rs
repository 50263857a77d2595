//! Document analysis backends.
//!
//! [`DocumentAnalyzer`] is the single seam between the request pipeline and the
//! remote OCR/table service. Production uses [`TextractAnalyzer`];
//! [`FixtureAnalyzer`] replays a saved response for offline runs and tests.

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use aws_sdk_textract::config::Region;
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::primitives::Blob;
use aws_sdk_textract::types as textract;
use aws_sdk_textract::Client;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::document::{
    AnalysisResponse, Block, BlockKind, Relationship, RelationshipKind,
};

#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Runs OCR and table detection over `content`, returning the raw blocks.
    async fn analyze(&self, content: &[u8]) -> AppResult<Vec<Block>>;

    fn name(&self) -> &'static str;
}

pub struct TextractAnalyzer {
    client: Client,
}

impl TextractAnalyzer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));
        if let Some(endpoint) = &config.textract_endpoint {
            info!(endpoint = %endpoint, "Using Textract endpoint override");
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        info!(region = %config.aws_region, "Textract client initialised");
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl DocumentAnalyzer for TextractAnalyzer {
    async fn analyze(&self, content: &[u8]) -> AppResult<Vec<Block>> {
        let start = Instant::now();
        info!("Calling Textract AnalyzeDocument ({} bytes)", content.len());

        let document = textract::Document::builder()
            .bytes(Blob::new(content.to_vec()))
            .build();

        let output = self
            .client
            .analyze_document()
            .document(document)
            .feature_types(textract::FeatureType::Tables)
            .send()
            .await
            .map_err(|e| AppError::analysis(DisplayErrorContext(&e).to_string()))?;

        let blocks: Vec<Block> = output.blocks().iter().map(Block::from).collect();

        info!(
            blocks = blocks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Textract analysis completed"
        );
        Ok(blocks)
    }

    fn name(&self) -> &'static str {
        "textract"
    }
}

impl From<&textract::Block> for Block {
    fn from(block: &textract::Block) -> Self {
        let kind = match block.block_type() {
            Some(textract::BlockType::Page) => BlockKind::Page,
            Some(textract::BlockType::Line) => BlockKind::Line,
            Some(textract::BlockType::Word) => BlockKind::Word,
            Some(textract::BlockType::Table) => BlockKind::Table,
            Some(textract::BlockType::Cell) => BlockKind::Cell,
            Some(textract::BlockType::SelectionElement) => BlockKind::SelectionElement,
            _ => BlockKind::Other,
        };

        let relationships = block
            .relationships()
            .iter()
            .map(|rel| Relationship {
                kind: match rel.r#type() {
                    Some(textract::RelationshipType::Child) => RelationshipKind::Child,
                    _ => RelationshipKind::Other,
                },
                ids: rel.ids().to_vec(),
            })
            .collect();

        Block {
            kind,
            id: block.id().unwrap_or_default().to_string(),
            text: block.text().map(str::to_string),
            relationships,
            row_index: block.row_index().and_then(|i| u32::try_from(i).ok()),
            column_index: block.column_index().and_then(|i| u32::try_from(i).ok()),
            selection_status: block.selection_status().map(|s| s.as_str().to_string()),
        }
    }
}

/// Serves the same blocks for every request.
#[derive(Debug, Clone, Default)]
pub struct FixtureAnalyzer {
    blocks: Vec<Block>,
}

impl FixtureAnalyzer {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Loads a saved Textract JSON response (`{"Blocks": [...]}`).
    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        if !path.is_file() {
            return Err(AppError::config(format!(
                "analysis fixture {} does not exist",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        let response: AnalysisResponse = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            blocks = response.blocks.len(),
            "Loaded analysis fixture"
        );
        Ok(Self::new(response.blocks))
    }
}

#[async_trait]
impl DocumentAnalyzer for FixtureAnalyzer {
    async fn analyze(&self, content: &[u8]) -> AppResult<Vec<Block>> {
        debug!("Replaying fixture analysis for {} bytes", content.len());
        Ok(self.blocks.clone())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
