//! Response wrapper for document-analysis output.
//!
//! The analysis service answers with a flat list of [`Block`]s linked by id.
//! [`Document::from_blocks`] rebuilds the page/table/row/cell hierarchy from
//! that list, keeping the order in which the provider returned the blocks.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    Page,
    Line,
    Word,
    Table,
    Cell,
    SelectionElement,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    Child,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Relationship {
    #[serde(rename = "Type")]
    pub kind: RelationshipKind,
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    #[serde(rename = "BlockType")]
    pub kind: BlockKind,
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub row_index: Option<u32>,
    #[serde(default)]
    pub column_index: Option<u32>,
    #[serde(default)]
    pub selection_status: Option<String>,
}

impl Block {
    pub fn new(kind: BlockKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            text: None,
            relationships: Vec::new(),
            row_index: None,
            column_index: None,
            selection_status: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_children<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationships.push(Relationship {
            kind: RelationshipKind::Child,
            ids: ids.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn at(mut self, row_index: u32, column_index: u32) -> Self {
        self.row_index = Some(row_index);
        self.column_index = Some(column_index);
        self
    }

    /// Ids of all CHILD relationships, in order.
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(|rel| rel.kind == RelationshipKind::Child)
            .flat_map(|rel| rel.ids.iter().map(String::as_str))
    }
}

/// Raw Textract response body, as saved by `aws textract analyze-document`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalysisResponse {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub text: String,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub text: String,
    pub row_index: u32,
    pub column_index: u32,
}

type BlockMap<'a> = HashMap<&'a str, &'a Block>;

impl Document {
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let block_map: BlockMap<'_> = blocks.iter().map(|b| (b.id.as_str(), b)).collect();

        let mut page_blocks: Vec<Vec<&Block>> = Vec::new();
        for block in blocks {
            if block.kind == BlockKind::Page {
                page_blocks.push(vec![block]);
            } else if let Some(current) = page_blocks.last_mut() {
                current.push(block);
            }
        }

        let pages = page_blocks
            .iter()
            .map(|blocks| Page::parse(blocks, &block_map))
            .collect();

        Self { pages }
    }

    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|p| p.tables.len()).sum()
    }
}

impl Page {
    fn parse(blocks: &[&Block], block_map: &BlockMap<'_>) -> Self {
        let mut page = Page::default();
        for block in blocks {
            match block.kind {
                BlockKind::Line => {
                    page.text.push_str(block.text.as_deref().unwrap_or_default());
                    page.text.push('\n');
                }
                BlockKind::Table => page.tables.push(Table::parse(block, block_map)),
                _ => {}
            }
        }
        page
    }
}

impl Table {
    fn parse(block: &Block, block_map: &BlockMap<'_>) -> Self {
        let mut rows: Vec<Row> = Vec::new();
        let mut current_row = 0;

        for id in block.child_ids() {
            let Some(cell_block) = block_map.get(id) else {
                continue;
            };
            let cell = Cell::parse(cell_block, block_map);
            if cell.row_index > current_row || rows.is_empty() {
                current_row = cell.row_index;
                rows.push(Row::default());
            }
            if let Some(row) = rows.last_mut() {
                row.cells.push(cell);
            }
        }

        Self { rows }
    }
}

impl Cell {
    fn parse(block: &Block, block_map: &BlockMap<'_>) -> Self {
        let mut text = String::new();
        for child in block.child_ids().filter_map(|id| block_map.get(id)) {
            match child.kind {
                BlockKind::Word => {
                    text.push_str(child.text.as_deref().unwrap_or_default());
                    text.push(' ');
                }
                BlockKind::SelectionElement => {
                    text.push_str(child.selection_status.as_deref().unwrap_or_default());
                    text.push_str(", ");
                }
                _ => {}
            }
        }

        Self {
            text,
            row_index: block.row_index.unwrap_or_default(),
            column_index: block.column_index.unwrap_or_default(),
        }
    }
}
