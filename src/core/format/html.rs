//! HTML rendering
//!
//! Produces a standalone page with an embedded stylesheet. Markup is built
//! with `maud`, which escapes every spliced value. Inline Markdown
//! (`**bold**`, `*italic*`, `` `code` ``) is converted after escaping and
//! spliced back in as pre-escaped markup.

use super::guide::{Block, BlockKind, Guide, ListKind};
use crate::core::processor::ProcessedContent;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use regex::Regex;
use std::sync::OnceLock;

const STYLESHEET: &str = r#"
:root {
  --gold: #CBA135;
  --burgundy: #582534;
  --coral: #E76F51;
  --ink: #1F1F1F;
  --paper: #FFFDF8;
}
body { margin: 0; background: var(--paper); color: var(--ink); font-family: Georgia, serif; line-height: 1.6; }
main { max-width: 760px; margin: 0 auto; padding: 2rem 1.5rem 4rem; }
header.guide-header { border-bottom: 3px solid var(--gold); margin-bottom: 2rem; padding-bottom: 1rem; }
.brand { color: var(--gold); font-size: 0.8rem; letter-spacing: 0.2em; text-transform: uppercase; }
h1 { color: var(--burgundy); margin: 0.3rem 0; }
h2, h3, h4, h5, h6 { color: var(--burgundy); }
.byline { font-style: italic; margin: 0; }
.reading-time-badge { display: inline-block; background: var(--gold); color: #fff; border-radius: 999px; padding: 0.1rem 0.7rem; font-size: 0.8rem; }
.guide-block { border-radius: 8px; margin: 1.5rem 0; padding: 1rem 1.25rem; }
.guide-block > .block-label { font-weight: bold; text-transform: uppercase; letter-spacing: 0.05em; font-size: 0.85rem; margin-bottom: 0.5rem; }
.quick-glance { background: #FBF5E6; border: 2px solid var(--gold); }
.insight-note { background: #F8EFF1; border-left: 5px solid var(--burgundy); }
.action-box { background: #FDF0EC; border-left: 5px solid var(--coral); }
.foundational-narrative { border-top: 1px solid var(--gold); border-bottom: 1px solid var(--gold); }
.takeaways { background: var(--burgundy); color: #fff; }
.exercise { border: 2px dashed var(--coral); }
.quote { font-style: italic; border-left: 4px solid var(--gold); }
.structure-map { background: #F4F4F4; }
.flow-step { background: #fff; border: 2px solid var(--gold); border-radius: 6px; padding: 0.5rem 1rem; text-align: center; }
.flow-arrow { color: var(--coral); text-align: center; font-size: 1.2rem; }
.styled-table { border-collapse: collapse; width: 100%; }
.styled-table th { background: var(--burgundy); color: #fff; }
.styled-table th, .styled-table td { border: 1px solid #DDD; padding: 0.4rem 0.6rem; text-align: left; }
"#;

/// Renders a guide as a standalone HTML document
pub fn render(content: &ProcessedContent, guide: &Guide) -> String {
    let reading_time = guide.reading_time_minutes();
    let author = content.author.trim();

    let page = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (content.title) }
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                main {
                    header.guide-header {
                        div.brand { "Folio" }
                        h1 { (content.title) }
                        @if !author.is_empty() {
                            p.byline { "by " (author) }
                        }
                        (reading_time_badge(reading_time))
                    }
                    (render_blocks(&guide.blocks, reading_time))
                }
            }
        }
    };
    page.into_string()
}

fn reading_time_badge(minutes: usize) -> Markup {
    html! {
        span.reading-time-badge { (minutes) " min read" }
    }
}

fn render_blocks(blocks: &[Block], reading_time: usize) -> Markup {
    html! {
        @for block in blocks {
            @match block {
                Block::Heading { level, text } => {
                    (heading(*level, inline(text)))
                }
                Block::Paragraph { text } => {
                    p { (inline(text)) }
                }
                Block::List { kind: ListKind::Unordered, items } => {
                    ul { @for item in items { li { (inline(item)) } } }
                }
                Block::List { kind: ListKind::Ordered, items } => {
                    ol { @for item in items { li { (inline(item)) } } }
                }
                Block::Special { kind, title, blocks, .. } => {
                    section class={ "guide-block " (kind.css_class()) } {
                        div.block-label {
                            (kind.label())
                            @if let Some(title) = title {
                                ": " (title)
                            }
                        }
                        @if *kind == BlockKind::QuickGlance {
                            (reading_time_badge(reading_time))
                        }
                        @match kind {
                            BlockKind::VisualFlowchart => {
                                (render_flowchart(&block.flow_steps()))
                            }
                            BlockKind::VisualTable => {
                                (render_table(&block.table_rows()))
                            }
                            BlockKind::Quote => {
                                blockquote { (render_blocks(blocks, reading_time)) }
                            }
                            _ => {
                                (render_blocks(blocks, reading_time))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Guide headings sit one level below the document title
fn heading(level: u8, text: Markup) -> Markup {
    match level.saturating_add(1).min(6) {
        0..=2 => html! { h2 { (text) } },
        3 => html! { h3 { (text) } },
        4 => html! { h4 { (text) } },
        5 => html! { h5 { (text) } },
        _ => html! { h6 { (text) } },
    }
}

fn render_flowchart(steps: &[String]) -> Markup {
    html! {
        @for (n, step) in steps.iter().enumerate() {
            @if n > 0 {
                div.flow-arrow { "\u{2193}" }
            }
            div.flow-step { (inline(step)) }
        }
    }
}

fn render_table(rows: &[Vec<String>]) -> Markup {
    let Some((header, body)) = rows.split_first() else {
        return html! {};
    };
    html! {
        table.styled-table {
            thead {
                tr { @for cell in header { th { (inline(cell)) } } }
            }
            tbody {
                @for row in body {
                    tr { @for cell in row { td { (inline(cell)) } } }
                }
            }
        }
    }
}

/// Escapes text, then converts inline Markdown to tags
fn inline(text: &str) -> Markup {
    struct Patterns {
        code: Regex,
        bold: Regex,
        italic: Regex,
    }
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| Patterns {
        code: Regex::new(r"`([^`]+)`").expect("code pattern is valid"),
        bold: Regex::new(r"\*\*([^*]+)\*\*").expect("bold pattern is valid"),
        italic: Regex::new(r"\*([^*]+)\*").expect("italic pattern is valid"),
    });

    let escaped = html! { (text) }.into_string();
    let with_code = patterns.code.replace_all(&escaped, "<code>$1</code>");
    let with_bold = patterns.bold.replace_all(&with_code, "<strong>$1</strong>");
    PreEscaped(
        patterns
            .italic
            .replace_all(&with_bold, "<em>$1</em>")
            .into_owned(),
    )
}
