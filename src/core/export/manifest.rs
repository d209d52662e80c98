//! Run manifest
//!
//! `manifest.json` lists every selected item of a run in filter order with
//! its outcome, alongside the run metadata. It is always JSON, whatever the
//! export format.

use crate::core::export::progress::RunState;
use crate::core::export::summary::ExportStage;
use crate::core::format::ExportFormat;
use crate::core::verification::report::VerificationReport;
use crate::domain::context::ResultExt;
use crate::domain::filter::BulkExportFilterContext;
use crate::domain::ids::{ItemId, RunId};
use crate::domain::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the manifest inside a run directory
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Manifest layout version
pub const MANIFEST_VERSION: u32 = 1;

/// Outcome of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// One selected item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub item_id: ItemId,
    pub title: String,
    pub status: ItemStatus,
    /// File name relative to the run directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<ExportStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ManifestEntry {
    fn bare(item_id: ItemId, title: String, status: ItemStatus) -> Self {
        Self {
            item_id,
            title,
            status,
            file: None,
            bytes: None,
            checksum: None,
            quality_score: None,
            stage: None,
            reason: None,
        }
    }

    pub fn succeeded(
        item_id: ItemId,
        title: impl Into<String>,
        file: impl Into<String>,
        bytes: u64,
        checksum: impl Into<String>,
        quality_score: Option<f64>,
    ) -> Self {
        Self {
            file: Some(file.into()),
            bytes: Some(bytes),
            checksum: Some(checksum.into()),
            quality_score,
            ..Self::bare(item_id, title.into(), ItemStatus::Succeeded)
        }
    }

    pub fn failed(
        item_id: ItemId,
        title: impl Into<String>,
        stage: ExportStage,
        reason: impl Into<String>,
        quality_score: Option<f64>,
    ) -> Self {
        Self {
            stage: Some(stage),
            reason: Some(reason.into()),
            quality_score,
            ..Self::bare(item_id, title.into(), ItemStatus::Failed)
        }
    }

    pub fn skipped(item_id: ItemId, title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::bare(item_id, title.into(), ItemStatus::Skipped)
        }
    }
}

/// Contents of `manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub format: ExportFormat,
    pub state: RunState,
    pub cancelled: bool,
    pub total_count: usize,
    pub succeeded_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub filter: BulkExportFilterContext,
    pub entries: Vec<ManifestEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
}

impl Manifest {
    /// Builds a manifest, deriving the counts from `entries`
    pub fn new(
        run_id: RunId,
        format: ExportFormat,
        state: RunState,
        filter: BulkExportFilterContext,
        entries: Vec<ManifestEntry>,
    ) -> Self {
        let count = |status| entries.iter().filter(|e| e.status == status).count();
        Self {
            version: MANIFEST_VERSION,
            run_id,
            created_at: Utc::now(),
            format,
            state,
            cancelled: state == RunState::Cancelled,
            total_count: entries.len(),
            succeeded_count: count(ItemStatus::Succeeded),
            failed_count: count(ItemStatus::Failed),
            skipped_count: count(ItemStatus::Skipped),
            filter,
            entries,
            verification: None,
        }
    }

    pub fn with_verification(mut self, report: Option<VerificationReport>) -> Self {
        self.verification = report;
        self
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json_bytes(&self) -> std::result::Result<Vec<u8>, serde_json::Error> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Reads the manifest of a run directory
    pub fn read_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(MANIFEST_FILE_NAME);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Manifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    fn sample() -> Manifest {
        Manifest::new(
            RunId::generate(),
            ExportFormat::Markdown,
            RunState::Completed,
            BulkExportFilterContext::all(),
            vec![
                ManifestEntry::succeeded(id("a"), "Walden", "Walden.md", 42, "ab12", Some(100.0)),
                ManifestEntry::failed(id("b"), "Ethics", ExportStage::Processing, "empty", None),
                ManifestEntry::skipped(id("c"), "Emile", "cancelled before start"),
            ],
        )
    }

    #[test]
    fn test_counts_follow_entries() {
        let manifest = sample();
        assert_eq!(manifest.total_count, 3);
        assert_eq!(manifest.succeeded_count, 1);
        assert_eq!(manifest.failed_count, 1);
        assert_eq!(manifest.skipped_count, 1);
        assert!(!manifest.cancelled);
    }

    #[test]
    fn test_entry_shape() {
        let value: serde_json::Value =
            serde_json::from_slice(&sample().to_json_bytes().unwrap()).unwrap();
        let entries = value["entries"].as_array().unwrap();
        assert_eq!(entries[0]["status"], "succeeded");
        assert_eq!(entries[0]["file"], "Walden.md");
        assert_eq!(entries[1]["stage"], "processing");
        assert!(entries[1].get("file").is_none());
        assert_eq!(entries[2]["status"], "skipped");
        assert!(value.get("verification").is_none());
    }

    #[test]
    fn test_read_from_dir() {
        let dir = TempDir::new().unwrap();
        let manifest = sample();
        std::fs::write(
            dir.path().join(MANIFEST_FILE_NAME),
            manifest.to_json_bytes().unwrap(),
        )
        .unwrap();

        let read = Manifest::read_from_dir(dir.path()).unwrap();
        assert_eq!(read, manifest);
    }

    #[test]
    fn test_read_missing_manifest_fails() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::read_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }
}
