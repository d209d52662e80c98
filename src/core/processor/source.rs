//! Source text processor
//!
//! Exports an item's stored guide text as-is. Inline content is used
//! directly; file content is read as UTF-8, with relative paths resolved
//! against the content root.

use super::{ContentProcessor, ProcessedContent};
use crate::domain::errors::ProcessingError;
use crate::domain::item::{ContentRef, LibraryItem};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Pass-through processor that returns the stored guide body
#[derive(Debug, Clone)]
pub struct SourceTextProcessor {
    content_root: PathBuf,
}

impl SourceTextProcessor {
    /// Creates a processor resolving relative content paths against `content_root`
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
        }
    }

    /// Directory relative content paths resolve against
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.content_root.join(path)
        }
    }
}

#[async_trait]
impl ContentProcessor for SourceTextProcessor {
    async fn process(&self, item: &LibraryItem) -> Result<ProcessedContent, ProcessingError> {
        let body = match &item.content {
            ContentRef::Inline { text } => text.clone(),
            ContentRef::File { path } => {
                let resolved = self.resolve(path);
                let bytes = tokio::fs::read(&resolved).await.map_err(|e| {
                    ProcessingError::ContentUnavailable(format!("{}: {}", resolved.display(), e))
                })?;
                String::from_utf8(bytes).map_err(|_| {
                    ProcessingError::ContentUnavailable(format!(
                        "{} is not valid UTF-8",
                        resolved.display()
                    ))
                })?
            }
        };

        if body.trim().is_empty() {
            return Err(ProcessingError::EmptyContent);
        }

        tracing::trace!(item_id = %item.id, bytes = body.len(), "Loaded source text");
        Ok(ProcessedContent::for_item(item, body))
    }
}
