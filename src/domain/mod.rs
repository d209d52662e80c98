//! Domain models and types for Folio.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ItemId`], [`RunId`])
//! - **Library models** ([`LibraryItem`], [`Library`], [`ContentRef`])
//! - **Selection predicates** ([`BulkExportFilterContext`], [`SortOrder`])
//! - **Error types** ([`FolioError`], [`FatalRunError`] and the per-item
//!   [`ProcessingError`], [`SerializationError`], [`WriteError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, FolioError>`]:
//!
//! ```rust
//! use folio::domain::{Library, Result};
//!
//! fn example() -> Result<usize> {
//!     let library = Library::from_json("[]")?;
//!     Ok(library.len())
//! }
//! ```
//!
//! # Builder Pattern
//!
//! ```rust
//! use folio::domain::{ContentRef, LibraryItem};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let item = LibraryItem::builder()
//!     .id("guide-7")?
//!     .title("Thinking, Fast and Slow")
//!     .author("Daniel Kahneman")
//!     .content(ContentRef::Inline { text: "# Systems".to_string() })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod errors;
pub mod filter;
pub mod ids;
pub mod item;
pub mod library;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{FatalRunError, FolioError, ProcessingError, SerializationError, WriteError};
pub use filter::{BulkExportFilterContext, SortOrder};
pub use ids::{ItemId, RunId};
pub use item::{ContentRef, LibraryItem, LibraryItemBuilder};
pub use library::Library;
pub use result::Result;
