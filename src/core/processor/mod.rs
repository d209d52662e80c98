//! Content processor gateway
//!
//! A [`ContentProcessor`] turns a library item into the guide body that gets
//! exported. The export pipeline only depends on this trait, so analysis
//! engines can be plugged in without touching the coordinator.

pub mod source;

pub use source::SourceTextProcessor;

use crate::domain::errors::ProcessingError;
use crate::domain::ids::ItemId;
use crate::domain::item::LibraryItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Output of a content processor for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedContent {
    /// Item the content was produced for
    pub item_id: ItemId,

    /// Guide title
    pub title: String,

    /// Author of the source work (may be empty)
    pub author: String,

    /// Kind of summary, if known
    pub summary_type: Option<String>,

    /// Reader profile the guide targets, if known
    pub reader_profile: Option<String>,

    /// Guide body in Markdown with guide block markers
    pub body: String,
}

impl ProcessedContent {
    /// Builds processed content carrying the item's metadata
    pub fn for_item(item: &LibraryItem, body: impl Into<String>) -> Self {
        Self {
            item_id: item.id.clone(),
            title: item.title.clone(),
            author: item.author.clone(),
            summary_type: item.summary_type.clone(),
            reader_profile: item.reader_profile.clone(),
            body: body.into(),
        }
    }
}

/// Capability that produces exportable content for an item
///
/// Implementations must be safe to call concurrently for distinct items.
/// A failure only affects the item being processed.
#[async_trait]
pub trait ContentProcessor: Send + Sync {
    /// Produces the exportable content for `item`
    async fn process(&self, item: &LibraryItem) -> Result<ProcessedContent, ProcessingError>;
}

#[async_trait]
impl<P: ContentProcessor + ?Sized> ContentProcessor for std::sync::Arc<P> {
    async fn process(&self, item: &LibraryItem) -> Result<ProcessedContent, ProcessingError> {
        (**self).process(item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ContentRef;

    #[test]
    fn test_processed_content_copies_metadata() {
        let item = LibraryItem::builder()
            .id("g-1")
            .unwrap()
            .title("Ethics")
            .author("Spinoza")
            .summary_type("full")
            .content(ContentRef::Inline {
                text: String::new(),
            })
            .build()
            .unwrap();

        let content = ProcessedContent::for_item(&item, "# Ethics");
        assert_eq!(content.item_id, item.id);
        assert_eq!(content.author, "Spinoza");
        assert_eq!(content.summary_type.as_deref(), Some("full"));
        assert_eq!(content.body, "# Ethics");
    }
}
