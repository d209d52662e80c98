//! Domain identifier types with validation
//!
//! Newtype wrappers keep library item ids and run ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a library item
///
/// # Examples
///
/// ```
/// use folio::domain::ids::ItemId;
/// use std::str::FromStr;
///
/// let id = ItemId::from_str("guide-0042").unwrap();
/// assert_eq!(id.as_str(), "guide-0042");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new ItemId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(ItemId)` if the ID is non-blank, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Item ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the item ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a single export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a fresh random run id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, used in directory names
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid run id '{s}': {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_creation() {
        let id = ItemId::new("guide-1").unwrap();
        assert_eq!(id.as_str(), "guide-1");
        assert_eq!(format!("{id}"), "guide-1");
    }

    #[test]
    fn test_item_id_empty_fails() {
        assert!(ItemId::new("").is_err());
        assert!(ItemId::new("   ").is_err());
    }

    #[test]
    fn test_item_id_ordering() {
        let mut ids = vec![
            ItemId::new("b").unwrap(),
            ItemId::new("a").unwrap(),
            ItemId::new("c").unwrap(),
        ];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(ItemId::as_str).collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_item_id_rejects_blank_on_deserialize() {
        assert!(serde_json::from_str::<ItemId>("\"  \"").is_err());
        let id: ItemId = serde_json::from_str("\"x-1\"").unwrap();
        assert_eq!(id.as_str(), "x-1");
    }

    #[test]
    fn test_run_id_short_and_parse() {
        let run_id = RunId::generate();
        assert_eq!(run_id.short().len(), 8);
        assert!(run_id.to_string().replace('-', "").starts_with(&run_id.short()));

        let parsed: RunId = run_id.to_string().parse().unwrap();
        assert_eq!(parsed, run_id);
        assert!("not-a-uuid".parse::<RunId>().is_err());
    }
}
