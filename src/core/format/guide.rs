//! Guide block model
//!
//! Guide bodies are Markdown-like text. On top of headings, lists and
//! paragraphs they carry special blocks delimited by bracketed markers:
//!
//! ```text
//! [QUICK_GLANCE]
//! - Core idea in one line
//! [/QUICK_GLANCE]
//!
//! [ACTION_BOX: Try this week]
//! 1. Block two hours
//! [/ACTION_BOX]
//! ```
//!
//! Parsing never fails. Blocks left open are closed at end of input and
//! stray closing markers are ignored; both are reported as [`ParseIssue`]s.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Words per minute used for reading time estimates
pub const WORDS_PER_MINUTE: usize = 200;

/// Kind of special guide block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    QuickGlance,
    InsightNote,
    ActionBox,
    FoundationalNarrative,
    Takeaways,
    Exercise,
    Quote,
    StructureMap,
    VisualFlowchart,
    VisualTable,
}

impl BlockKind {
    /// Resolves a marker name such as `QUICK_GLANCE` or `EXERCISE_REFLECTION`
    ///
    /// Returns the kind plus a title derived from the marker name, if any.
    pub fn from_marker(name: &str) -> Option<(Self, Option<String>)> {
        let kind = match name {
            "QUICK_GLANCE" => Self::QuickGlance,
            "INSIGHT_NOTE" => Self::InsightNote,
            "ACTION_BOX" => Self::ActionBox,
            "FOUNDATIONAL_NARRATIVE" => Self::FoundationalNarrative,
            "TAKEAWAYS" => Self::Takeaways,
            "EXERCISE" => Self::Exercise,
            "QUOTE" => Self::Quote,
            "STRUCTURE_MAP" => Self::StructureMap,
            "VISUAL_FLOWCHART" => Self::VisualFlowchart,
            "VISUAL_TABLE" => Self::VisualTable,
            other => {
                let suffix = other.strip_prefix("EXERCISE_")?;
                if suffix.is_empty() {
                    return None;
                }
                return Some((Self::Exercise, Some(title_case(suffix))));
            }
        };
        Some((kind, None))
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::QuickGlance => "Quick Glance",
            Self::InsightNote => "Insight",
            Self::ActionBox => "Action Box",
            Self::FoundationalNarrative => "Foundational Narrative",
            Self::Takeaways => "Key Takeaways",
            Self::Exercise => "Exercise",
            Self::Quote => "Quote",
            Self::StructureMap => "Structure Map",
            Self::VisualFlowchart => "Flowchart",
            Self::VisualTable => "Table",
        }
    }

    /// CSS class used by the HTML export
    pub fn css_class(self) -> &'static str {
        match self {
            Self::QuickGlance => "quick-glance",
            Self::InsightNote => "insight-note",
            Self::ActionBox => "action-box",
            Self::FoundationalNarrative => "foundational-narrative",
            Self::Takeaways => "takeaways",
            Self::Exercise => "exercise",
            Self::Quote => "quote",
            Self::StructureMap => "structure-map",
            Self::VisualFlowchart => "visual-flowchart",
            Self::VisualTable => "visual-table",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered or unordered list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// One block of a parsed guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    List {
        kind: ListKind,
        items: Vec<String>,
    },
    Special {
        kind: BlockKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Markdown content of the block
        blocks: Vec<Block>,
        /// Raw lines, used by flowcharts and tables
        #[serde(skip)]
        lines: Vec<String>,
    },
}

impl Block {
    /// Table rows of a special block; the first row is the header
    ///
    /// Separator rows (`|---|:--:|`) are dropped.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        let Block::Special { lines, .. } = self else {
            return Vec::new();
        };
        lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| l.starts_with('|'))
            .map(|l| {
                l.trim_matches('|')
                    .split('|')
                    .map(|c| c.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.iter().all(|c| is_separator_cell(c)))
            .collect()
    }

    /// Steps of a flowchart block
    ///
    /// Each line is a step unless a line chains steps with `->` or `→`.
    pub fn flow_steps(&self) -> Vec<String> {
        let Block::Special { lines, .. } = self else {
            return Vec::new();
        };
        lines
            .iter()
            .flat_map(|line| {
                line.split("->")
                    .flat_map(|part| part.split('→'))
                    .map(|s| strip_list_marker(s.trim()).trim_matches('↓').trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Problem found while parsing a guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ParseIssue {
    /// A block was still open at end of input or when another block opened
    UnclosedBlock { kind: BlockKind, line: usize },
    /// A closing marker without a matching open block
    StrayClosingMarker { marker: String, line: usize },
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnclosedBlock { kind, line } => {
                write!(f, "{kind} block opened on line {line} is never closed")
            }
            Self::StrayClosingMarker { marker, line } => {
                write!(f, "closing marker [/{marker}] on line {line} has no open block")
            }
        }
    }
}

/// A parsed guide body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guide {
    pub blocks: Vec<Block>,
    pub issues: Vec<ParseIssue>,
    pub word_count: usize,
}

impl Guide {
    /// Parses a guide body
    pub fn parse(body: &str) -> Self {
        let mut blocks = Vec::new();
        let mut issues = Vec::new();
        let mut outer: Vec<&str> = Vec::new();
        let mut open: Option<OpenBlock<'_>> = None;
        let mut word_count = 0;

        for (index, line) in body.lines().enumerate() {
            let line_no = index + 1;

            if let Some(marker) = Marker::parse(line) {
                match marker {
                    Marker::Open { kind, title } => {
                        if let Some(current) = open.take() {
                            issues.push(ParseIssue::UnclosedBlock {
                                kind: current.kind,
                                line: current.line,
                            });
                            blocks.push(current.finish());
                        }
                        blocks.extend(parse_markdown(&outer));
                        outer.clear();
                        open = Some(OpenBlock {
                            kind,
                            title,
                            line: line_no,
                            lines: Vec::new(),
                        });
                    }
                    Marker::Close { kind, name } => match open.take() {
                        Some(current) if current.kind == kind => blocks.push(current.finish()),
                        other => {
                            open = other;
                            issues.push(ParseIssue::StrayClosingMarker {
                                marker: name,
                                line: line_no,
                            });
                        }
                    },
                }
                continue;
            }

            word_count += count_words(line);
            match open.as_mut() {
                Some(current) => current.lines.push(line),
                None => outer.push(line),
            }
        }

        if let Some(current) = open.take() {
            issues.push(ParseIssue::UnclosedBlock {
                kind: current.kind,
                line: current.line,
            });
            blocks.push(current.finish());
        }
        blocks.extend(parse_markdown(&outer));

        Self {
            blocks,
            issues,
            word_count,
        }
    }

    /// Estimated reading time in whole minutes (at least one)
    pub fn reading_time_minutes(&self) -> usize {
        reading_time_minutes(self.word_count)
    }

    /// Returns true if the guide contains a special block of `kind`
    pub fn has_block(&self, kind: BlockKind) -> bool {
        self.blocks
            .iter()
            .any(|b| matches!(b, Block::Special { kind: k, .. } if *k == kind))
    }

    /// Top-level headings as `(level, text)` pairs
    pub fn headings(&self) -> impl Iterator<Item = (u8, &str)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading { level, text } => Some((*level, text.as_str())),
            _ => None,
        })
    }
}

/// Reading time for a word count: `ceil(words / 200)`, minimum one minute
pub fn reading_time_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Removes inline Markdown emphasis and code markers
pub fn strip_inline(text: &str) -> String {
    text.replace("**", "").replace(['`', '*'], "")
}

struct OpenBlock<'a> {
    kind: BlockKind,
    title: Option<String>,
    line: usize,
    lines: Vec<&'a str>,
}

impl OpenBlock<'_> {
    fn finish(self) -> Block {
        let blocks = match self.kind {
            BlockKind::VisualFlowchart | BlockKind::VisualTable => Vec::new(),
            _ => parse_markdown(&self.lines),
        };
        Block::Special {
            kind: self.kind,
            title: self.title,
            blocks,
            lines: self
                .lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

enum Marker {
    Open {
        kind: BlockKind,
        title: Option<String>,
    },
    Close {
        kind: BlockKind,
        name: String,
    },
}

impl Marker {
    fn parse(line: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"^\[(/?)([A-Z][A-Z_]*)(?::\s*([^\]]*))?\]$")
                .expect("marker pattern is valid")
        });

        let caps = re.captures(line.trim())?;
        let name = caps.get(2)?.as_str();
        let (kind, derived_title) = BlockKind::from_marker(name)?;

        if !caps[1].is_empty() {
            return Some(Self::Close {
                kind,
                name: name.to_string(),
            });
        }

        let title = caps
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty())
            .or(derived_title);
        Some(Self::Open { kind, title })
    }
}

fn parse_markdown(lines: &[&str]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut list: Option<(ListKind, Vec<String>)> = None;

    fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
        if !paragraph.is_empty() {
            blocks.push(Block::Paragraph {
                text: paragraph.join(" "),
            });
            paragraph.clear();
        }
    }

    fn flush_list(list: &mut Option<(ListKind, Vec<String>)>, blocks: &mut Vec<Block>) {
        if let Some((kind, items)) = list.take() {
            blocks.push(Block::List { kind, items });
        }
    }

    for raw in lines {
        let line = raw.trim();

        if line.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            flush_list(&mut list, &mut blocks);
            continue;
        }

        if let Some((level, text)) = parse_heading(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            flush_list(&mut list, &mut blocks);
            blocks.push(Block::Heading {
                level,
                text: text.to_string(),
            });
            continue;
        }

        if let Some((kind, text)) = parse_list_item(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            match list.as_mut() {
                Some((current, items)) if *current == kind => items.push(text.to_string()),
                _ => {
                    flush_list(&mut list, &mut blocks);
                    list = Some((kind, vec![text.to_string()]));
                }
            }
            continue;
        }

        flush_list(&mut list, &mut blocks);
        paragraph.push(line);
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    flush_list(&mut list, &mut blocks);
    blocks
}

fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let text = line[level..].strip_prefix(' ')?.trim();
    if text.is_empty() {
        return None;
    }
    Some((level as u8, text))
}

fn parse_list_item(line: &str) -> Option<(ListKind, &str)> {
    for bullet in ["- ", "* ", "+ "] {
        if let Some(text) = line.strip_prefix(bullet) {
            return Some((ListKind::Unordered, text.trim()));
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let text = rest
        .strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))?;
    Some((ListKind::Ordered, text.trim()))
}

fn strip_list_marker(line: &str) -> &str {
    parse_list_item(line).map_or(line, |(_, text)| text)
}

fn is_separator_cell(cell: &str) -> bool {
    let inner = cell.trim_start_matches(':').trim_end_matches(':');
    !inner.is_empty() && inner.chars().all(|c| c == '-')
}

fn count_words(line: &str) -> usize {
    line.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

fn title_case(marker_suffix: &str) -> String {
    marker_suffix
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Meditations

Marcus wrote for **himself**.

[QUICK_GLANCE]
- Control what you can
- Accept the rest
[/QUICK_GLANCE]

## Book One

1. Gratitude
2. Duty

[ACTION_BOX: Daily practice]
Reflect each evening.
[/ACTION_BOX]

[TAKEAWAYS]
- Virtue is enough
[/TAKEAWAYS]
";

    #[test]
    fn test_parse_structure() {
        let guide = Guide::parse(SAMPLE);
        assert!(guide.issues.is_empty());
        assert_eq!(
            guide.blocks[0],
            Block::Heading {
                level: 1,
                text: "Meditations".to_string()
            }
        );
        assert!(matches!(guide.blocks[1], Block::Paragraph { .. }));
        assert!(guide.has_block(BlockKind::QuickGlance));
        assert!(guide.has_block(BlockKind::Takeaways));
        assert!(!guide.has_block(BlockKind::Quote));
        assert_eq!(guide.headings().count(), 2);
    }

    #[test]
    fn test_list_kinds_are_tracked() {
        let guide = Guide::parse("- a\n- b\n1. c\n2. d\n");
        assert_eq!(
            guide.blocks,
            vec![
                Block::List {
                    kind: ListKind::Unordered,
                    items: vec!["a".to_string(), "b".to_string()]
                },
                Block::List {
                    kind: ListKind::Ordered,
                    items: vec!["c".to_string(), "d".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_action_box_title() {
        let guide = Guide::parse(SAMPLE);
        let action = guide
            .blocks
            .iter()
            .find(|b| matches!(b, Block::Special { kind: BlockKind::ActionBox, .. }))
            .unwrap();
        let Block::Special { title, blocks, .. } = action else {
            unreachable!()
        };
        assert_eq!(title.as_deref(), Some("Daily practice"));
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_named_exercise() {
        let guide = Guide::parse("[EXERCISE_SELF_REFLECTION]\nWrite it down.\n[/EXERCISE_SELF_REFLECTION]");
        assert!(guide.issues.is_empty());
        let Block::Special { kind, title, .. } = &guide.blocks[0] else {
            panic!("expected special block");
        };
        assert_eq!(*kind, BlockKind::Exercise);
        assert_eq!(title.as_deref(), Some("Self Reflection"));
    }

    #[test]
    fn test_unclosed_block_is_closed_and_reported() {
        let guide = Guide::parse("[INSIGHT_NOTE]\nSomething true.");
        assert_eq!(
            guide.issues,
            vec![ParseIssue::UnclosedBlock {
                kind: BlockKind::InsightNote,
                line: 1
            }]
        );
        assert!(guide.has_block(BlockKind::InsightNote));
    }

    #[test]
    fn test_stray_closing_marker() {
        let guide = Guide::parse("Text\n[/QUOTE]\n");
        assert_eq!(
            guide.issues,
            vec![ParseIssue::StrayClosingMarker {
                marker: "QUOTE".to_string(),
                line: 2
            }]
        );
    }

    #[test]
    fn test_unknown_markers_are_text() {
        let guide = Guide::parse("[NOT_A_BLOCK]");
        assert_eq!(
            guide.blocks,
            vec![Block::Paragraph {
                text: "[NOT_A_BLOCK]".to_string()
            }]
        );
    }

    #[test]
    fn test_table_rows() {
        let guide = Guide::parse(
            "[VISUAL_TABLE]\n| Idea | Source |\n|---|:---:|\n| Virtue | Stoics |\n[/VISUAL_TABLE]",
        );
        assert_eq!(
            guide.blocks[0].table_rows(),
            vec![
                vec!["Idea".to_string(), "Source".to_string()],
                vec!["Virtue".to_string(), "Stoics".to_string()],
            ]
        );
    }

    #[test]
    fn test_flow_steps() {
        let guide = Guide::parse("[VISUAL_FLOWCHART]\nNotice -> Pause\n1. Choose\n[/VISUAL_FLOWCHART]");
        assert_eq!(guide.blocks[0].flow_steps(), vec!["Notice", "Pause", "Choose"]);
    }

    #[test]
    fn test_word_count_and_reading_time() {
        let guide = Guide::parse("one two three\n[QUOTE]\nfour - five\n[/QUOTE]");
        assert_eq!(guide.word_count, 5);
        assert_eq!(guide.reading_time_minutes(), 1);

        assert_eq!(reading_time_minutes(0), 1);
        assert_eq!(reading_time_minutes(200), 1);
        assert_eq!(reading_time_minutes(201), 2);
    }

    #[test]
    fn test_strip_inline() {
        assert_eq!(strip_inline("**bold** and *it* `code`"), "bold and it code");
    }
}
