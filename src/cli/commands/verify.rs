//! Verify command implementation
//!
//! This module implements the `verify` command, which re-checks the files
//! of a finished run against the checksums in its manifest.

use crate::cli::exit_code;
use crate::core::verification::Verifier;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Run directory containing manifest.json
    pub dir: PathBuf,
}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(dir = %self.dir.display(), "Verifying export");

        println!("🔍 Verifying export: {}", self.dir.display());
        println!();

        let report = match Verifier::new().verify_run_directory(&self.dir).await {
            Ok(report) => report,
            Err(e) => {
                println!("❌ Failed to read manifest");
                println!("   Error: {e}");
                return Ok(exit_code::FATAL);
            }
        };

        print!("{}", report.format_summary());
        println!();

        if report.is_success() {
            println!("✅ All files match their checksums");
            Ok(exit_code::SUCCESS)
        } else {
            println!("⚠️  Some files are missing or modified");
            Ok(exit_code::PARTIAL_FAILURE)
        }
    }
}
