//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use folio::core::processor::{ContentProcessor, ProcessedContent};
use folio::domain::{ContentRef, LibraryItem, ProcessingError};
use std::time::Duration;
use tokio::sync::watch;

/// Body that makes [`ScriptedProcessor`] fail the item
pub const FAIL: &str = "@fail";

/// Body that makes [`ScriptedProcessor`] request cancellation, then finish
pub const CANCEL: &str = "@cancel";

/// Body that makes [`ScriptedProcessor`] request cancellation, then hang
pub const CANCEL_AND_HANG: &str = "@cancel-hang";

/// Processor driven by the item body
///
/// Any other body is exported as-is.
pub struct ScriptedProcessor {
    cancel: Option<watch::Sender<bool>>,
}

impl ScriptedProcessor {
    pub fn new() -> Self {
        Self { cancel: None }
    }

    pub fn cancelling(cancel: watch::Sender<bool>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    fn request_cancel(&self) {
        if let Some(tx) = &self.cancel {
            let _ = tx.send(true);
        }
    }
}

#[async_trait]
impl ContentProcessor for ScriptedProcessor {
    async fn process(&self, item: &LibraryItem) -> Result<ProcessedContent, ProcessingError> {
        let ContentRef::Inline { text } = &item.content else {
            return Err(ProcessingError::ContentUnavailable(
                "inline content only".to_string(),
            ));
        };

        match text.as_str() {
            FAIL => Err(ProcessingError::Failed(format!(
                "analysis rejected '{}'",
                item.title
            ))),
            CANCEL => {
                self.request_cancel();
                Ok(ProcessedContent::for_item(item, format!("# {}\n\nDone.", item.title)))
            }
            CANCEL_AND_HANG => {
                self.request_cancel();
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(ProcessedContent::for_item(item, "never"))
            }
            body => Ok(ProcessedContent::for_item(item, body)),
        }
    }
}

pub fn item(id: &str, title: &str, body: &str) -> LibraryItem {
    LibraryItem::builder()
        .id(id)
        .unwrap()
        .title(title)
        .author("Seneca")
        .summary_type("full")
        .created_at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        .content(ContentRef::Inline {
            text: body.to_string(),
        })
        .build()
        .unwrap()
}

/// A small library of well-formed guides
pub fn library(count: usize) -> Vec<LibraryItem> {
    (1..=count)
        .map(|n| {
            item(
                &format!("guide-{n}"),
                &format!("Letter {n}"),
                &format!("# Letter {n}\n\n[QUICK_GLANCE]\n- Point {n}\n[/QUICK_GLANCE]\n\nOn the shortness of life."),
            )
        })
        .collect()
}

/// Names of the regular files in `dir`, sorted
pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
