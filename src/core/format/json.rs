//! JSON rendering

use super::guide::{Block, BlockKind, Guide, ParseIssue};
use crate::core::processor::ProcessedContent;
use crate::domain::errors::SerializationError;
use serde::Serialize;

#[derive(Serialize)]
struct GuideDocument<'a> {
    id: &'a str,
    title: &'a str,
    author: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reader_profile: Option<&'a str>,
    word_count: usize,
    reading_time_minutes: usize,
    blocks: Vec<BlockDocument<'a>>,
    #[serde(skip_serializing_if = "no_issues")]
    issues: &'a [ParseIssue],
}

/// Block plus the structured data of flowcharts and tables
#[derive(Serialize)]
struct BlockDocument<'a> {
    #[serde(flatten)]
    block: &'a Block,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    steps: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rows: Vec<Vec<String>>,
}

/// Renders a guide as a pretty-printed JSON document
pub fn render(content: &ProcessedContent, guide: &Guide) -> Result<Vec<u8>, SerializationError> {
    let document = GuideDocument {
        id: content.item_id.as_str(),
        title: &content.title,
        author: &content.author,
        summary_type: content.summary_type.as_deref(),
        reader_profile: content.reader_profile.as_deref(),
        word_count: guide.word_count,
        reading_time_minutes: guide.reading_time_minutes(),
        blocks: guide.blocks.iter().map(block_document).collect(),
        issues: &guide.issues,
    };

    let mut bytes = serde_json::to_vec_pretty(&document)
        .map_err(|e| SerializationError::Encoding(e.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn no_issues(issues: &&[ParseIssue]) -> bool {
    issues.is_empty()
}

fn block_document(block: &Block) -> BlockDocument<'_> {
    let (steps, rows) = match block {
        Block::Special {
            kind: BlockKind::VisualFlowchart,
            ..
        } => (block.flow_steps(), Vec::new()),
        Block::Special {
            kind: BlockKind::VisualTable,
            ..
        } => (Vec::new(), block.table_rows()),
        _ => (Vec::new(), Vec::new()),
    };
    BlockDocument { block, steps, rows }
}
