//! Plain text rendering

use super::byline;
use super::guide::{strip_inline, Block, BlockKind, Guide, ListKind};
use crate::core::processor::ProcessedContent;

/// Renders a guide as plain text
pub fn render(content: &ProcessedContent, guide: &Guide) -> String {
    let mut out = String::new();

    out.push_str(&content.title);
    out.push('\n');
    out.push_str(&"=".repeat(content.title.chars().count().max(3)));
    out.push('\n');
    if let Some(byline) = byline(content) {
        out.push_str(&byline);
        out.push('\n');
    }
    out.push_str(&format!(
        "Reading time: {} min\n\n",
        guide.reading_time_minutes()
    ));

    render_blocks(&guide.blocks, "", &mut out);

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn render_blocks(blocks: &[Block], indent: &str, out: &mut String) {
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let text = strip_inline(text);
                out.push_str(indent);
                if *level <= 2 {
                    out.push_str(&text.to_uppercase());
                } else {
                    out.push_str(&text);
                }
                out.push_str("\n\n");
            }
            Block::Paragraph { text } => {
                out.push_str(indent);
                out.push_str(&strip_inline(text));
                out.push_str("\n\n");
            }
            Block::List { kind, items } => {
                for (n, item) in items.iter().enumerate() {
                    out.push_str(indent);
                    match kind {
                        ListKind::Unordered => out.push_str("- "),
                        ListKind::Ordered => out.push_str(&format!("{}. ", n + 1)),
                    }
                    out.push_str(&strip_inline(item));
                    out.push('\n');
                }
                out.push('\n');
            }
            Block::Special {
                kind, title, blocks, ..
            } => {
                out.push_str(indent);
                out.push_str(&format!("[{}]", kind.label().to_uppercase()));
                if let Some(title) = title {
                    out.push_str(&format!(" {title}"));
                }
                out.push('\n');

                let nested = format!("{indent}  ");
                match kind {
                    BlockKind::VisualFlowchart => {
                        let steps = block.flow_steps();
                        out.push_str(&nested);
                        out.push_str(&steps.join(" -> "));
                        out.push_str("\n\n");
                    }
                    BlockKind::VisualTable => {
                        for row in block.table_rows() {
                            out.push_str(&nested);
                            out.push_str(&row.join(" | "));
                            out.push('\n');
                        }
                        out.push('\n');
                    }
                    _ => render_blocks(blocks, &nested, out),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemId;

    fn content(body: &str) -> ProcessedContent {
        ProcessedContent {
            item_id: ItemId::new("g-1").unwrap(),
            title: "Walden".to_string(),
            author: "Thoreau".to_string(),
            summary_type: None,
            reader_profile: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_render_header_and_blocks() {
        let c = content("# Economy\n\nLive **deliberately**.\n\n1. Sell\n2. Walk");
        let text = render(&c, &Guide::parse(&c.body));
        assert!(text.starts_with("Walden\n======\nby Thoreau\nReading time: 1 min\n\n"));
        assert!(text.contains("ECONOMY\n\nLive deliberately.\n\n1. Sell\n2. Walk"));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn test_render_special_blocks() {
        let c = content(
            "[QUICK_GLANCE]\n- Simplify\n[/QUICK_GLANCE]\n[VISUAL_FLOWCHART]\nWake -> Walk\n[/VISUAL_FLOWCHART]",
        );
        let text = render(&c, &Guide::parse(&c.body));
        assert!(text.contains("[QUICK GLANCE]\n  - Simplify"));
        assert!(text.contains("[FLOWCHART]\n  Wake -> Walk"));
    }
}
