//! Bulk export filter context
//!
//! A [`BulkExportFilterContext`] is a pure value describing which library
//! items an export run should include and in which order. Every predicate is
//! optional; an empty context matches every item.

use super::ids::ItemId;
use super::item::LibraryItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Order in which selected items are exported
///
/// Ties are always broken by item id so that selection is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep the order of the library snapshot
    #[default]
    Library,
    /// Case-insensitive title order
    Title,
    /// Oldest first
    CreatedAt,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "library" => Ok(Self::Library),
            "title" => Ok(Self::Title),
            "created_at" | "created" => Ok(Self::CreatedAt),
            _ => Err(format!(
                "Invalid sort order '{s}'. Must be one of: library, title, created_at"
            )),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Library => "library",
            Self::Title => "title",
            Self::CreatedAt => "created_at",
        };
        f.write_str(name)
    }
}

/// Selection predicates for a bulk export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkExportFilterContext {
    /// Only items written for one of these reader profiles
    pub reader_profiles: BTreeSet<String>,

    /// Only items with one of these summary types
    pub summary_types: BTreeSet<String>,

    /// Items carrying at least one of these tags
    pub tags_any: BTreeSet<String>,

    /// Items carrying all of these tags
    pub tags_all: BTreeSet<String>,

    /// Items created at or after this instant
    pub created_after: Option<DateTime<Utc>>,

    /// Items created at or before this instant
    pub created_before: Option<DateTime<Utc>>,

    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,

    /// Restrict the export to these item ids
    pub item_ids: BTreeSet<ItemId>,

    /// Output order
    pub sort: SortOrder,
}

impl BulkExportFilterContext {
    /// Creates a context that matches every item
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to items with the given tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags_any.insert(tag.into());
        self
    }

    /// Restricts to items with the given summary type
    pub fn with_summary_type(mut self, summary_type: impl Into<String>) -> Self {
        self.summary_types.insert(summary_type.into());
        self
    }

    /// Restricts to items with the given reader profile
    pub fn with_reader_profile(mut self, profile: impl Into<String>) -> Self {
        self.reader_profiles.insert(profile.into());
        self
    }

    /// Sets the output order
    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Validates the context
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found: an inverted date
    /// range or a blank predicate value.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(after), Some(before)) = (self.created_after, self.created_before) {
            if after > before {
                return Err(format!(
                    "created_after ({after}) is later than created_before ({before})"
                ));
            }
        }

        let sets = [
            ("reader_profiles", &self.reader_profiles),
            ("summary_types", &self.summary_types),
            ("tags_any", &self.tags_any),
            ("tags_all", &self.tags_all),
        ];
        for (name, values) in sets {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(format!("{name} contains a blank value"));
            }
        }

        if matches!(&self.title_contains, Some(t) if t.trim().is_empty()) {
            return Err("title_contains cannot be blank".to_string());
        }

        Ok(())
    }

    /// Returns true if the item satisfies every predicate
    pub fn matches(&self, item: &LibraryItem) -> bool {
        if !self.item_ids.is_empty() && !self.item_ids.contains(&item.id) {
            return false;
        }

        if !self.reader_profiles.is_empty()
            && !matches_any(&self.reader_profiles, item.reader_profile.as_deref())
        {
            return false;
        }

        if !self.summary_types.is_empty()
            && !matches_any(&self.summary_types, item.summary_type.as_deref())
        {
            return false;
        }

        if !self.tags_any.is_empty() && !self.tags_any.iter().any(|t| item.has_tag(t)) {
            return false;
        }

        if !self.tags_all.iter().all(|t| item.has_tag(t)) {
            return false;
        }

        if matches!(self.created_after, Some(after) if item.created_at < after) {
            return false;
        }

        if matches!(self.created_before, Some(before) if item.created_at > before) {
            return false;
        }

        if let Some(needle) = &self.title_contains {
            if !item.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

fn matches_any(accepted: &BTreeSet<String>, value: Option<&str>) -> bool {
    value.is_some_and(|v| accepted.iter().any(|a| a.eq_ignore_ascii_case(v)))
}
