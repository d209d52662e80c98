//! Filter engine
//!
//! Selects the ordered subset of a library snapshot that an export run will
//! attempt. Selection is a pure function of its inputs.

use crate::domain::filter::{BulkExportFilterContext, SortOrder};
use crate::domain::item::LibraryItem;
use std::collections::HashSet;

/// Selects the items matching `filter`, in the filter's sort order
///
/// Duplicate ids among the matching items are collapsed to their first
/// occurrence in library order.
/// Sorting is stable and ties are broken by item id.
///
/// # Examples
///
/// ```
/// use folio::core::filter::select;
/// use folio::domain::{BulkExportFilterContext, ContentRef, LibraryItem};
///
/// let item = LibraryItem::builder()
///     .id("g-1").unwrap()
///     .title("Walden")
///     .tag("nature")
///     .content(ContentRef::Inline { text: String::new() })
///     .build()
///     .unwrap();
///
/// let selected = select(&[item], &BulkExportFilterContext::all().with_tag("nature"));
/// assert_eq!(selected.len(), 1);
/// ```
pub fn select(items: &[LibraryItem], filter: &BulkExportFilterContext) -> Vec<LibraryItem> {
    let mut seen = HashSet::new();
    let mut selected: Vec<LibraryItem> = items
        .iter()
        .filter(|item| filter.matches(item))
        .filter(|item| seen.insert(item.id.clone()))
        .cloned()
        .collect();

    match filter.sort {
        SortOrder::Library => {}
        SortOrder::Title => selected.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        }),
        SortOrder::CreatedAt => {
            selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
        }
    }

    tracing::debug!(
        candidates = items.len(),
        selected = selected.len(),
        sort = %filter.sort,
        "Filtered library items"
    );

    selected
}
