//! Library item domain model
//!
//! A [`LibraryItem`] is one guide in the user's library. The export pipeline
//! never mutates items; it only reads their metadata and hands them to a
//! content processor.

use super::ids::ItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Reference to an item's raw content
///
/// The pipeline treats this as opaque; only content processors resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentRef {
    /// Content embedded directly in the library snapshot
    Inline { text: String },
    /// Content stored in a file (relative paths resolve against the content root)
    File { path: PathBuf },
}

/// A single entry of the document library
///
/// # Examples
///
/// ```
/// use folio::domain::item::{ContentRef, LibraryItemBuilder};
///
/// let item = LibraryItemBuilder::new()
///     .id("guide-1").unwrap()
///     .title("Deep Work")
///     .author("Cal Newport")
///     .summary_type("full")
///     .tag("productivity")
///     .content(ContentRef::Inline { text: "# Deep Work".to_string() })
///     .build()
///     .unwrap();
///
/// assert_eq!(item.title, "Deep Work");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Stable identifier
    pub id: ItemId,

    /// Display title (also the basis of the exported file name)
    pub title: String,

    /// Author of the source work
    #[serde(default)]
    pub author: String,

    /// Reader profile the guide was written for (e.g. "student")
    #[serde(default)]
    pub reader_profile: Option<String>,

    /// Kind of summary (e.g. "full", "quick")
    #[serde(default)]
    pub summary_type: Option<String>,

    /// Free-form tags
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// When the item was added to the library
    pub created_at: DateTime<Utc>,

    /// Where the content lives
    pub content: ContentRef,
}

impl LibraryItem {
    /// Creates a new builder for constructing a LibraryItem
    pub fn builder() -> LibraryItemBuilder {
        LibraryItemBuilder::default()
    }

    /// Returns true if the item carries the tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Builder for constructing LibraryItem instances
#[derive(Debug, Default)]
pub struct LibraryItemBuilder {
    id: Option<ItemId>,
    title: Option<String>,
    author: Option<String>,
    reader_profile: Option<String>,
    summary_type: Option<String>,
    tags: BTreeSet<String>,
    created_at: Option<DateTime<Utc>>,
    content: Option<ContentRef>,
}

impl LibraryItemBuilder {
    /// Creates a new LibraryItemBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the item id
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank
    pub fn id(mut self, id: impl Into<String>) -> Result<Self, String> {
        self.id = Some(ItemId::new(id)?);
        Ok(self)
    }

    /// Sets the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the reader profile
    pub fn reader_profile(mut self, profile: impl Into<String>) -> Self {
        self.reader_profile = Some(profile.into());
        self
    }

    /// Sets the summary type
    pub fn summary_type(mut self, summary_type: impl Into<String>) -> Self {
        self.summary_type = Some(summary_type.into());
        self
    }

    /// Adds a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Sets the creation timestamp
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the content reference
    pub fn content(mut self, content: ContentRef) -> Self {
        self.content = Some(content);
        self
    }

    /// Builds the LibraryItem
    ///
    /// `created_at` defaults to the Unix epoch so that builders used in tests
    /// stay deterministic.
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing
    pub fn build(self) -> Result<LibraryItem, String> {
        Ok(LibraryItem {
            id: self.id.ok_or("id is required")?,
            title: self.title.ok_or("title is required")?,
            author: self.author.unwrap_or_default(),
            reader_profile: self.reader_profile,
            summary_type: self.summary_type,
            tags: self.tags,
            created_at: self.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            content: self.content.ok_or("content is required")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(text: &str) -> ContentRef {
        ContentRef::Inline {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_item_builder() {
        let item = LibraryItemBuilder::new()
            .id("guide-1")
            .unwrap()
            .title("Atomic Habits")
            .author("James Clear")
            .reader_profile("student")
            .tag("habits")
            .tag("self-help")
            .content(inline("body"))
            .build()
            .unwrap();

        assert_eq!(item.id.as_str(), "guide-1");
        assert_eq!(item.reader_profile.as_deref(), Some("student"));
        assert_eq!(item.tags.len(), 2);
        assert_eq!(item.created_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_item_builder_missing_field() {
        let result = LibraryItemBuilder::new()
            .id("guide-1")
            .unwrap()
            .content(inline("body"))
            .build();

        assert!(result.unwrap_err().contains("title is required"));
    }

    #[test]
    fn test_item_builder_blank_id() {
        assert!(LibraryItemBuilder::new().id(" ").is_err());
    }

    #[test]
    fn test_has_tag_ignores_case() {
        let item = LibraryItem::builder()
            .id("g")
            .unwrap()
            .title("t")
            .tag("Philosophy")
            .content(inline("x"))
            .build()
            .unwrap();

        assert!(item.has_tag("philosophy"));
        assert!(!item.has_tag("history"));
    }

    #[test]
    fn test_content_ref_serialization() {
        let file = ContentRef::File {
            path: PathBuf::from("guides/a.md"),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["path"], "guides/a.md");

        let back: ContentRef = serde_json::from_value(json).unwrap();
        assert_eq!(back, file);
    }
}
