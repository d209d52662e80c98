//! Verification logic for post-export validation
//!
//! Re-reads every file a manifest claims was written and compares its
//! SHA-256 checksum with the recorded one.

use crate::core::export::manifest::{ItemStatus, Manifest, ManifestEntry};
use crate::core::verification::checksum::calculate_file_checksum;
use crate::core::verification::report::{FileCheck, VerificationFailure, VerificationReport};
use crate::domain::Result;
use std::path::Path;
use std::time::Instant;

/// Verifier for exported run directories
#[derive(Debug, Default, Clone, Copy)]
pub struct Verifier;

impl Verifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify the files of succeeded entries under `dir`
    ///
    /// Failed and skipped entries are not considered. A succeeded entry
    /// without a file or checksum is counted as skipped.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use folio::core::verification::Verifier;
    /// use folio::core::export::manifest::Manifest;
    ///
    /// # async fn example() -> folio::domain::Result<()> {
    /// let manifest = Manifest::read_from_dir("exports/folio-export-20250101T000000Z-1a2b3c4d")?;
    /// let report = Verifier::new()
    ///     .verify_output("exports/folio-export-20250101T000000Z-1a2b3c4d", &manifest.entries)
    ///     .await;
    /// println!("{}", report.format_summary());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn verify_output(
        &self,
        dir: impl AsRef<Path>,
        entries: &[ManifestEntry],
    ) -> VerificationReport {
        let dir = dir.as_ref();
        let start = Instant::now();
        let mut report = VerificationReport::new();

        let succeeded = entries
            .iter()
            .filter(|e| e.status == ItemStatus::Succeeded);

        tracing::info!(
            dir = %dir.display(),
            entries = entries.len(),
            "Starting post-export verification"
        );

        for entry in succeeded {
            report.record(check_entry(dir, entry).await);
        }

        report.finish(start.elapsed());

        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            duration_ms = report.duration_ms,
            "Verification completed"
        );

        report
    }

    /// Reads the manifest in `dir` and verifies the files it lists
    pub async fn verify_run_directory(&self, dir: impl AsRef<Path>) -> Result<VerificationReport> {
        let dir = dir.as_ref();
        let manifest = Manifest::read_from_dir(dir)?;
        Ok(self.verify_output(dir, &manifest.entries).await)
    }
}

/// Checks one succeeded entry against the file on disk
async fn check_entry(dir: &Path, entry: &ManifestEntry) -> FileCheck {
    let (Some(file), Some(expected)) = (&entry.file, &entry.checksum) else {
        tracing::debug!(item_id = %entry.item_id, "No checksum recorded, skipping");
        return FileCheck::Unrecorded;
    };

    let failure = |actual_checksum: Option<String>, reason: String| {
        FileCheck::Failed(VerificationFailure {
            item_id: entry.item_id.clone(),
            file: file.clone(),
            expected_checksum: expected.clone(),
            actual_checksum,
            reason,
        })
    };

    match calculate_file_checksum(dir.join(file)).await {
        Ok(actual) if actual == *expected => FileCheck::Matched,
        Ok(actual) => {
            tracing::warn!(item_id = %entry.item_id, file = %file, "Checksum mismatch");
            failure(Some(actual), "Checksum mismatch".to_string())
        }
        Err(e) => {
            tracing::warn!(item_id = %entry.item_id, file = %file, error = %e, "File unreadable");
            failure(None, format!("Failed to read file: {e}"))
        }
    }
}
