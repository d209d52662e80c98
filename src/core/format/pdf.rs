//! PDF rendering
//!
//! A small PDF 1.4 writer using the standard Helvetica fonts with WinAnsi
//! encoding. Output carries no creation date so identical guides produce
//! identical files.

use super::guide::{strip_inline, Block, BlockKind, Guide, ListKind};
use crate::core::processor::ProcessedContent;
use crate::domain::errors::SerializationError;
use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const BODY_SIZE: f32 = 11.0;
const BLOCK_INDENT: f32 = 18.0;

/// Average glyph widths as a fraction of the font size
const REGULAR_WIDTH: f32 = 0.5;
const BOLD_WIDTH: f32 = 0.56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    fn width_factor(self) -> f32 {
        match self {
            Font::Regular => REGULAR_WIDTH,
            Font::Bold => BOLD_WIDTH,
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    font: Font,
    size: f32,
    indent: f32,
    gap_before: f32,
    text: Vec<u8>,
}

/// Renders a guide as a PDF document
///
/// # Errors
///
/// Returns [`SerializationError::UnsupportedContent`] if any text contains a
/// character outside the WinAnsi character set.
pub fn render(content: &ProcessedContent, guide: &Guide) -> Result<Vec<u8>, SerializationError> {
    let mut layout = Layout::default();

    layout.paragraph(&content.title, Font::Bold, 20.0, 0.0, 0.0)?;
    if !content.author.trim().is_empty() {
        layout.paragraph(&format!("by {}", content.author.trim()), Font::Regular, 12.0, 0.0, 4.0)?;
    }
    layout.paragraph(
        &format!("Reading time: {} min", guide.reading_time_minutes()),
        Font::Regular,
        10.0,
        0.0,
        4.0,
    )?;
    layout.blocks(&guide.blocks, 0.0)?;

    let pages = paginate(&layout.lines);
    Ok(write_document(
        &encode(&content.title)?,
        &encode(content.author.trim())?,
        &pages,
    ))
}

#[derive(Default)]
struct Layout {
    lines: Vec<Line>,
}

impl Layout {
    fn blocks(&mut self, blocks: &[Block], indent: f32) -> Result<(), SerializationError> {
        for block in blocks {
            match block {
                Block::Heading { level, text } => {
                    let size = match level {
                        1 => 16.0,
                        2 => 14.0,
                        _ => 12.0,
                    };
                    self.paragraph(&strip_inline(text), Font::Bold, size, indent, 12.0)?;
                }
                Block::Paragraph { text } => {
                    self.paragraph(&strip_inline(text), Font::Regular, BODY_SIZE, indent, 8.0)?;
                }
                Block::List { kind, items } => {
                    for (n, item) in items.iter().enumerate() {
                        let marker = match kind {
                            ListKind::Unordered => "\u{2022}".to_string(),
                            ListKind::Ordered => format!("{}.", n + 1),
                        };
                        let gap = if n == 0 { 8.0 } else { 2.0 };
                        self.list_item(&marker, &strip_inline(item), indent, gap)?;
                    }
                }
                Block::Special {
                    kind, title, blocks, ..
                } => {
                    let label = match title {
                        Some(title) => format!("{}: {}", kind.label().to_uppercase(), title),
                        None => kind.label().to_uppercase(),
                    };
                    self.paragraph(&label, Font::Bold, 12.0, indent, 14.0)?;

                    let nested = indent + BLOCK_INDENT;
                    match kind {
                        BlockKind::VisualFlowchart => {
                            for (n, step) in block.flow_steps().iter().enumerate() {
                                let text = if n == 0 {
                                    strip_inline(step)
                                } else {
                                    format!("-> {}", strip_inline(step))
                                };
                                self.paragraph(&text, Font::Regular, BODY_SIZE, nested, 4.0)?;
                            }
                        }
                        BlockKind::VisualTable => {
                            for (n, row) in block.table_rows().iter().enumerate() {
                                let font = if n == 0 { Font::Bold } else { Font::Regular };
                                let text = strip_inline(&row.join("  |  "));
                                self.paragraph(&text, font, BODY_SIZE, nested, 4.0)?;
                            }
                        }
                        _ => self.blocks(blocks, nested)?,
                    }
                }
            }
        }
        Ok(())
    }

    fn paragraph(
        &mut self,
        text: &str,
        font: Font,
        size: f32,
        indent: f32,
        gap_before: f32,
    ) -> Result<(), SerializationError> {
        let width = PAGE_WIDTH - 2.0 * MARGIN - indent;
        for (n, wrapped) in wrap(text, font, size, width).into_iter().enumerate() {
            self.lines.push(Line {
                font,
                size,
                indent,
                gap_before: if n == 0 { gap_before } else { 0.0 },
                text: encode(&wrapped)?,
            });
        }
        Ok(())
    }

    fn list_item(
        &mut self,
        marker: &str,
        text: &str,
        indent: f32,
        gap_before: f32,
    ) -> Result<(), SerializationError> {
        let hanging = indent + BLOCK_INDENT;
        self.lines.push(Line {
            font: Font::Regular,
            size: BODY_SIZE,
            indent,
            gap_before,
            text: encode(marker)?,
        });
        let width = PAGE_WIDTH - 2.0 * MARGIN - hanging;
        for (n, wrapped) in wrap(text, Font::Regular, BODY_SIZE, width)
            .into_iter()
            .enumerate()
        {
            self.lines.push(Line {
                font: Font::Regular,
                size: BODY_SIZE,
                indent: hanging,
                // The first text line shares the marker's baseline
                gap_before: if n == 0 { -line_height(BODY_SIZE) } else { 0.0 },
                text: encode(&wrapped)?,
            });
        }
        Ok(())
    }
}

fn line_height(size: f32) -> f32 {
    size * 1.35
}

/// Narrowest line `wrap` will produce
///
/// Deeply nested blocks can leave little or no horizontal room. Lines then
/// overflow the right margin instead of breaking every character or two.
const MIN_LINE_CHARS: usize = 10;

fn wrap(text: &str, font: Font, size: f32, width: f32) -> Vec<String> {
    let max_chars = ((width / (size * font.width_factor())) as usize).max(MIN_LINE_CHARS);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(split);
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encodes text as WinAnsi bytes
fn encode(text: &str) -> Result<Vec<u8>, SerializationError> {
    text.chars()
        .map(|c| {
            let byte = match c {
                '\t' => Some(b' '),
                ' '..='~' => Some(c as u8),
                '\u{a0}'..='\u{ff}' => Some(c as u32 as u8),
                '\u{20ac}' => Some(0x80),
                '\u{2026}' => Some(0x85),
                '\u{2018}' => Some(0x91),
                '\u{2019}' => Some(0x92),
                '\u{201c}' => Some(0x93),
                '\u{201d}' => Some(0x94),
                '\u{2022}' => Some(0x95),
                '\u{2013}' => Some(0x96),
                '\u{2014}' => Some(0x97),
                '\u{2122}' => Some(0x99),
                _ => None,
            };
            byte.ok_or_else(|| SerializationError::UnsupportedContent {
                format: "pdf".to_string(),
                reason: format!(
                    "character '{c}' (U+{:04X}) cannot be encoded with the built-in PDF fonts",
                    c as u32
                ),
            })
        })
        .collect()
}

/// Writes encoded bytes as a PDF literal string
fn literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{b:03o}");
            }
        }
    }
    out.push(')');
    out
}

fn paginate(lines: &[Line]) -> Vec<String> {
    let mut pages = Vec::new();
    let mut stream = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let advance = line.gap_before + line_height(line.size);
        if y - advance < MARGIN && !stream.is_empty() && line.gap_before >= 0.0 {
            pages.push(std::mem::take(&mut stream));
            y = PAGE_HEIGHT - MARGIN;
        } else {
            y -= line.gap_before;
        }
        y -= line_height(line.size);

        let _ = writeln!(
            stream,
            "BT /{} {:.1} Tf {:.2} {:.2} Td {} Tj ET",
            line.font.resource(),
            line.size,
            MARGIN + line.indent,
            y,
            literal(&line.text)
        );
    }

    if !stream.is_empty() || pages.is_empty() {
        pages.push(stream);
    }
    pages
}

fn write_document(title: &[u8], author: &[u8], pages: &[String]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 6 + 2 * i))
        .collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );
    objects.push(format!(
        "<< /Title {} /Author {} /Producer (Folio) >>",
        literal(title),
        literal(author)
    ));

    for (i, stream) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            7 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    );
    out.extend_from_slice(xref.as_bytes());
    out
}
