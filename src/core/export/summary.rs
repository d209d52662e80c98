//! Export results and reporting
//!
//! This module defines the terminal record of a run and the per-item error
//! and file records it is built from.

use crate::core::export::progress::RunState;
use crate::core::format::ExportFormat;
use crate::core::verification::report::VerificationReport;
use crate::domain::ids::{ItemId, RunId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline stage at which an item failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    Processing,
    Serialization,
    Write,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Processing => "processing",
            Self::Serialization => "serialization",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Failure of one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportError {
    pub item_id: ItemId,
    pub title: String,
    pub stage: ExportStage,
    /// Description of the underlying cause
    pub message: String,
}

impl ExportError {
    pub fn new(
        item_id: ItemId,
        title: impl Into<String>,
        stage: ExportStage,
        message: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            title: title.into(),
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {} failed: {}", self.title, self.item_id, self.stage, self.message)
    }
}

/// A file written for one item
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub item_id: ItemId,
    /// Path relative to the run's output directory
    pub file_name: String,
    pub bytes: u64,
    /// Hex-encoded SHA-256 of the file contents
    pub checksum: String,
    pub quality_score: Option<f64>,
}

/// Terminal record of an export run
#[derive(Debug, Clone)]
pub struct BulkExportResult {
    pub run_id: RunId,
    pub format: ExportFormat,
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub state: RunState,
    pub cancelled: bool,
    pub succeeded_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    /// Per-item failures in filter order
    pub errors: Vec<ExportError>,
    /// Written files in filter order
    pub files: Vec<ExportedFile>,
    pub elapsed: Duration,
    pub verification: Option<VerificationReport>,
}

impl BulkExportResult {
    /// Number of selected items
    pub fn total_count(&self) -> usize {
        self.succeeded_count + self.failed_count + self.skipped_count
    }

    /// True when every selected item was exported
    pub fn is_successful(&self) -> bool {
        self.failed_count == 0
            && self.skipped_count == 0
            && self
                .verification
                .as_ref()
                .map_or(true, VerificationReport::is_success)
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total_count();
        if total == 0 {
            return 100.0;
        }
        (self.succeeded_count as f64 / total as f64) * 100.0
    }

    /// Log the result
    pub fn log_summary(&self) {
        crate::log_export_complete!(
            self.run_id,
            self.succeeded_count,
            self.failed_count,
            self.skipped_count,
            self.elapsed
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                success_rate = format!("{:.2}%", self.success_rate()),
                "Export completed with errors"
            );
        }
        if self.cancelled {
            tracing::warn!(
                run_id = %self.run_id,
                skipped = self.skipped_count,
                "Export was cancelled"
            );
        }
    }

    /// Format the result as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Export Summary\n");
        summary.push_str(&format!("  Output: {}\n", self.output_dir.display()));
        summary.push_str(&format!("  Format: {}\n", self.format));
        summary.push_str(&format!("  State: {}\n", self.state));
        summary.push_str(&format!("  Duration: {:.2}s\n", self.elapsed.as_secs_f64()));
        summary.push_str(&format!("  ✅ Exported: {}\n", self.succeeded_count));
        summary.push_str(&format!("  ❌ Failed: {}\n", self.failed_count));
        summary.push_str(&format!("  ⏭️  Skipped: {}\n", self.skipped_count));

        if !self.errors.is_empty() {
            summary.push_str("\n❌ Failures:\n");
            for (i, error) in self.errors.iter().enumerate() {
                summary.push_str(&format!("  {}. {}\n", i + 1, error));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(succeeded: usize, failed: usize, skipped: usize) -> BulkExportResult {
        BulkExportResult {
            run_id: RunId::generate(),
            format: ExportFormat::Markdown,
            output_dir: PathBuf::from("exports/run"),
            manifest_path: PathBuf::from("exports/run/manifest.json"),
            state: RunState::Completed,
            cancelled: false,
            succeeded_count: succeeded,
            failed_count: failed,
            skipped_count: skipped,
            errors: Vec::new(),
            files: Vec::new(),
            elapsed: Duration::from_millis(1500),
            verification: None,
        }
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(result(3, 1, 0).success_rate(), 75.0);
        assert_eq!(result(0, 0, 0).success_rate(), 100.0);
    }

    #[test]
    fn test_is_successful() {
        assert!(result(2, 0, 0).is_successful());
        assert!(result(0, 0, 0).is_successful());
        assert!(!result(2, 1, 0).is_successful());
        assert!(!result(2, 0, 1).is_successful());
    }

    #[test]
    fn test_format_summary_lists_errors() {
        let mut res = result(1, 1, 0);
        res.errors.push(ExportError::new(
            ItemId::new("g-2").unwrap(),
            "Meditations",
            ExportStage::Serialization,
            "bad glyph",
        ));

        let summary = res.format_summary();
        assert!(summary.contains("Exported: 1"));
        assert!(summary.contains("Failed: 1"));
        assert!(summary.contains("1. Meditations (g-2): serialization failed: bad glyph"));
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ExportStage::Serialization).unwrap(),
            "\"serialization\""
        );
    }
}
