//! Verification report structures

use crate::domain::ids::ItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of checking one manifest entry against the file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCheck {
    /// The file exists and its checksum matches
    Matched,
    /// The entry records no file or checksum
    Unrecorded,
    /// The file is missing, unreadable or modified
    Failed(VerificationFailure),
}

/// Outcome of re-checking a run directory
///
/// Serialized into the manifest when verification runs as part of an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub verified_at: DateTime<Utc>,

    /// Succeeded entries considered
    pub total_verified: usize,

    pub passed: usize,
    pub failed: usize,

    /// Succeeded entries without a recorded file or checksum
    pub skipped: usize,

    pub failures: Vec<VerificationFailure>,

    pub duration_ms: u64,
}

/// A file that did not match its manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub item_id: ItemId,

    /// File name relative to the run directory
    pub file: String,

    pub expected_checksum: String,

    /// Recalculated checksum; `None` when the file could not be read
    pub actual_checksum: Option<String>,

    pub reason: String,
}

impl VerificationFailure {
    /// True when the file could not be read at all
    pub fn is_missing(&self) -> bool {
        self.actual_checksum.is_none()
    }
}

impl VerificationReport {
    /// Empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            verified_at: Utc::now(),
            total_verified: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Adds one entry's check
    pub fn record(&mut self, check: FileCheck) {
        self.total_verified += 1;
        match check {
            FileCheck::Matched => self.passed += 1,
            FileCheck::Unrecorded => self.skipped += 1,
            FileCheck::Failed(failure) => {
                self.failed += 1;
                self.failures.push(failure);
            }
        }
    }

    /// Stamps how long the checks took
    pub fn finish(&mut self, elapsed: Duration) {
        self.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    }

    /// True when no file was missing or modified
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Share of considered entries that matched, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_verified == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total_verified as f64) * 100.0
    }

    /// Human-readable report for the console
    pub fn format_summary(&self) -> String {
        let missing = self.failures.iter().filter(|f| f.is_missing()).count();

        let mut out = format!(
            "🔍 Verification: {}/{} files match ({:.1}%) in {} ms\n",
            self.passed,
            self.total_verified,
            self.success_rate(),
            self.duration_ms
        );
        if self.skipped > 0 {
            out.push_str(&format!("  ⏭️  {} without a recorded checksum\n", self.skipped));
        }
        if self.failed > 0 {
            out.push_str(&format!(
                "  ❌ {} modified, {} missing\n",
                self.failed - missing,
                missing
            ));
            for failure in &self.failures {
                out.push_str(&format!(
                    "     - {} ({}): {}\n",
                    failure.file, failure.item_id, failure.reason
                ));
            }
        }
        out
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::new()
    }
}
