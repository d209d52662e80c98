//! Markdown rendering
//!
//! Special blocks become blockquotes led by a bold label so the output reads
//! well in any Markdown viewer.

use super::byline;
use super::guide::{Block, BlockKind, Guide, ListKind};
use crate::core::processor::ProcessedContent;

/// Renders a guide as Markdown
pub fn render(content: &ProcessedContent, guide: &Guide) -> String {
    let mut out = format!("# {}\n\n", content.title);
    if let Some(byline) = byline(content) {
        out.push_str(&format!("*{byline}*\n\n"));
    }
    out.push_str(&format!(
        "_Reading time: {} min_\n\n",
        guide.reading_time_minutes()
    ));

    let mut body = String::new();
    render_blocks(&guide.blocks, &mut body);
    out.push_str(body.trim_end());
    out.push('\n');
    out
}

fn render_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                // The document title owns the only level-one heading
                let level = (*level as usize + 1).min(6);
                out.push_str(&format!("{} {}\n\n", "#".repeat(level), text));
            }
            Block::Paragraph { text } => {
                out.push_str(text);
                out.push_str("\n\n");
            }
            Block::List { kind, items } => {
                render_list(*kind, items, "", out);
                out.push('\n');
            }
            Block::Special {
                kind, title, blocks, ..
            } => {
                let mut inner = String::new();
                match kind {
                    BlockKind::VisualFlowchart => {
                        for (n, step) in block.flow_steps().iter().enumerate() {
                            inner.push_str(&format!("{}. {}\n", n + 1, step));
                        }
                    }
                    BlockKind::VisualTable => render_table(&block.table_rows(), &mut inner),
                    _ => render_blocks(blocks, &mut inner),
                }

                let heading = match title {
                    Some(title) => format!("**{}: {}**", kind.label(), title),
                    None => format!("**{}**", kind.label()),
                };
                out.push_str(&format!("> {heading}\n>\n"));
                for line in inner.trim_end().lines() {
                    if line.is_empty() {
                        out.push_str(">\n");
                    } else {
                        out.push_str(&format!("> {line}\n"));
                    }
                }
                out.push('\n');
            }
        }
    }
}

fn render_list(kind: ListKind, items: &[String], indent: &str, out: &mut String) {
    for (n, item) in items.iter().enumerate() {
        match kind {
            ListKind::Unordered => out.push_str(&format!("{indent}- {item}\n")),
            ListKind::Ordered => out.push_str(&format!("{indent}{}. {item}\n", n + 1)),
        }
    }
}

fn render_table(rows: &[Vec<String>], out: &mut String) {
    let Some(header) = rows.first() else {
        return;
    };
    out.push_str(&format!("| {} |\n", header.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(header.len())));
    for row in &rows[1..] {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
}
