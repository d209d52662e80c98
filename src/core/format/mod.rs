//! Format serializers
//!
//! Converts [`ProcessedContent`] into the bytes of one exported file. Every
//! serializer is deterministic: the same content always produces the same
//! bytes, with no timestamps or generated ids.
//!
//! # Example
//!
//! ```
//! use folio::core::format::{serialize, ExportFormat};
//! use folio::core::processor::ProcessedContent;
//! use folio::domain::ItemId;
//!
//! let content = ProcessedContent {
//!     item_id: ItemId::new("g-1").unwrap(),
//!     title: "Walden".to_string(),
//!     author: "Henry David Thoreau".to_string(),
//!     summary_type: None,
//!     reader_profile: None,
//!     body: "# Economy\n\nSimplify.".to_string(),
//! };
//!
//! let bytes = serialize(&content, ExportFormat::Markdown).unwrap();
//! assert!(String::from_utf8(bytes).unwrap().starts_with("# Walden"));
//! ```

pub mod guide;
pub mod html;
pub mod json;
pub mod markdown;
pub mod pdf;
pub mod text;

use crate::core::processor::ProcessedContent;
use crate::domain::errors::SerializationError;
use guide::Guide;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Plain UTF-8 text
    #[serde(rename = "text", alias = "plain_text")]
    PlainText,
    /// Markdown
    #[default]
    Markdown,
    /// Structured JSON document
    Json,
    /// Standalone HTML page with embedded styles
    Html,
    /// PDF 1.4 document
    Pdf,
}

impl ExportFormat {
    /// All formats, in display order
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::PlainText,
        ExportFormat::Markdown,
        ExportFormat::Json,
        ExportFormat::Html,
        ExportFormat::Pdf,
    ];

    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }

    /// Configuration name of the format
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "plain_text" | "plaintext" => Ok(Self::PlainText),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "html" | "htm" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            _ => Err(format!(
                "Invalid format '{s}'. Must be one of: text, markdown, json, html, pdf"
            )),
        }
    }
}

/// Serializes processed content into the bytes of one output file
///
/// # Errors
///
/// Returns [`SerializationError::UnsupportedContent`] when the content
/// cannot be represented in `format`, e.g. PDF output for characters the
/// built-in font cannot encode.
pub fn serialize(
    content: &ProcessedContent,
    format: ExportFormat,
) -> Result<Vec<u8>, SerializationError> {
    let guide = Guide::parse(&content.body);
    match format {
        ExportFormat::PlainText => Ok(text::render(content, &guide).into_bytes()),
        ExportFormat::Markdown => Ok(markdown::render(content, &guide).into_bytes()),
        ExportFormat::Json => json::render(content, &guide),
        ExportFormat::Html => Ok(html::render(content, &guide).into_bytes()),
        ExportFormat::Pdf => pdf::render(content, &guide),
    }
}

/// Byline shared by the text-based formats
pub(crate) fn byline(content: &ProcessedContent) -> Option<String> {
    let author = content.author.trim();
    (!author.is_empty()).then(|| format!("by {author}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_are_distinct() {
        let mut extensions: Vec<_> = ExportFormat::ALL.iter().map(|f| f.extension()).collect();
        extensions.sort_unstable();
        extensions.dedup();
        assert_eq!(extensions.len(), ExportFormat::ALL.len());
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for format in ExportFormat::ALL {
            assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), format);
        }
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ExportFormat::PlainText).unwrap();
        assert_eq!(json, "\"text\"");
        let parsed: ExportFormat = serde_json::from_str("\"plain_text\"").unwrap();
        assert_eq!(parsed, ExportFormat::PlainText);
    }
}
