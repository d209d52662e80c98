//! Library snapshot
//!
//! A [`Library`] is the caller-owned, ordered collection of items handed to
//! an export run. Snapshots are stored as JSON, either as a bare array of
//! items or as an object with an `items` array.

use super::context::ResultExt;
use super::errors::FolioError;
use super::item::LibraryItem;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered snapshot of library items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    /// Items in library order
    pub items: Vec<LibraryItem>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LibraryDocument {
    Wrapped { items: Vec<LibraryItem> },
    Bare(Vec<LibraryItem>),
}

impl Library {
    /// Creates a library from items in the given order
    pub fn new(items: Vec<LibraryItem>) -> Self {
        Self { items }
    }

    /// Parses a library snapshot from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Library`] if the text is neither an item array
    /// nor an object with an `items` array.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: LibraryDocument = serde_json::from_str(json)
            .map_err(|e| FolioError::Library(format!("Invalid library snapshot: {e}")))?;

        let items = match document {
            LibraryDocument::Wrapped { items } => items,
            LibraryDocument::Bare(items) => items,
        };
        Ok(Self { items })
    }

    /// Loads a library snapshot from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read library snapshot {}", path.display()))?;

        let library = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse library snapshot {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            items = library.len(),
            "Loaded library snapshot"
        );
        Ok(library)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the library has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
