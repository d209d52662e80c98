//! Export command implementation
//!
//! This module implements the `export` command, which exports the configured
//! library snapshot into a new run directory.

use crate::cli::exit_code;
use crate::config::{load_config, FolioConfig};
use crate::core::export::{
    BulkExportProgress, BulkExportResult, ExportCoordinator, ExportRequest, ExportSettings,
    RunState,
};
use crate::core::format::ExportFormat;
use crate::core::processor::SourceTextProcessor;
use crate::domain::{FolioError, Library};
use clap::Args;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Override output format (text, markdown, json, html, pdf)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Override base output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override number of items exported concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Only export items carrying this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Only export items of this summary type (repeatable)
    #[arg(long = "summary-type", value_name = "TYPE")]
    pub summary_types: Vec<String>,

    /// Only export items for this reader profile (repeatable)
    #[arg(long = "profile", value_name = "PROFILE")]
    pub profiles: Vec<String>,

    /// Verify written files against their checksums after the export
    #[arg(long)]
    pub verify: bool,
}

impl ExportArgs {
    /// Applies command-line overrides to a loaded configuration
    pub fn apply_overrides(&self, config: &mut FolioConfig) -> Result<(), String> {
        if let Some(format) = &self.format {
            tracing::info!(format = %format, "Overriding export format from CLI");
            config.export.format = ExportFormat::from_str(format)?;
        }

        if let Some(dir) = &self.output_dir {
            tracing::info!(output_dir = %dir.display(), "Overriding output directory from CLI");
            config.export.output_dir = dir.clone();
        }

        if let Some(concurrency) = self.concurrency {
            tracing::info!(concurrency, "Overriding concurrency from CLI");
            config.export.concurrency = concurrency;
        }

        if self.verify {
            config.export.verify_output = true;
        }

        config.filter.tags_any.extend(self.tags.iter().cloned());
        config
            .filter
            .summary_types
            .extend(self.summary_types.iter().cloned());
        config
            .filter
            .reader_profiles
            .extend(self.profiles.iter().cloned());

        config.validate()
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code::CONFIG_ERROR);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(exit_code::CONFIG_ERROR);
        }

        let library = match Library::from_json_file(&config.library.path) {
            Ok(library) => library,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load library");
                eprintln!("Failed to load library: {e}");
                return Ok(exit_code::CONFIG_ERROR);
            }
        };

        // Confirmation prompt (unless --yes)
        if !self.yes {
            println!("Export Configuration:");
            println!("  Library: {} ({} items)", config.library.path.display(), library.len());
            println!("  Format: {}", config.export.format);
            println!("  Output: {}", config.export.output_dir.display());
            println!("  Concurrency: {}", config.export.concurrency);
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(exit_code::SUCCESS);
            }
        }

        let coordinator = ExportCoordinator::new(
            SourceTextProcessor::new(config.library.resolved_content_root()),
            ExportSettings::from_config(&config.export),
        );

        let (progress_tx, progress_rx) = watch::channel(BulkExportProgress::default());
        let reporter = tokio::spawn(report_progress(progress_rx));

        let request = ExportRequest::new(library.items, config.export.format)
            .with_filter(config.filter.clone())
            .with_shutdown(shutdown_signal)
            .with_progress(progress_tx);

        println!("🚀 Starting export...");
        println!();

        let outcome = coordinator.execute_export(request).await;
        let _ = reporter.await;

        let result = match outcome {
            Ok(result) => result,
            Err(FolioError::Fatal(e)) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(exit_code::FATAL);
            }
            Err(e) => return Err(e.into()),
        };

        println!();
        print!("{}", result.format_summary());
        println!("  Manifest: {}", result.manifest_path.display());
        println!();

        if let Some(report) = &result.verification {
            print!("{}", report.format_summary());
            println!();
        }

        Ok(exit_code_for(&result))
    }
}

/// Prints a line each time another item settles
async fn report_progress(mut rx: watch::Receiver<BulkExportProgress>) {
    let mut last_settled = 0;
    while rx.changed().await.is_ok() {
        let progress = rx.borrow_and_update().clone();
        if progress.settled_count() > last_settled {
            last_settled = progress.settled_count();
            println!(
                "  [{}/{}] {:.0}% ({} failed)",
                last_settled,
                progress.total_count,
                progress.fraction() * 100.0,
                progress.failed_count
            );
        }
        if progress.state.is_terminal() {
            break;
        }
    }
}

/// Maps a finished run to the process exit code
pub fn exit_code_for(result: &BulkExportResult) -> i32 {
    if result.state == RunState::Cancelled {
        println!("⚠️  Export cancelled. Items that had not started were skipped.");
        tracing::info!("Export interrupted by user signal");
        exit_code::CANCELLED
    } else if result.is_successful() {
        println!("✅ Export completed successfully!");
        exit_code::SUCCESS
    } else {
        println!("⚠️  Export completed with failures");
        exit_code::PARTIAL_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn config() -> FolioConfig {
        parse_config("[library]\npath = \"library.json\"\n").unwrap()
    }

    #[test]
    fn test_export_args_defaults() {
        let args = ExportArgs::default();
        assert!(!args.yes);
        assert!(args.format.is_none());
        assert!(args.tags.is_empty());
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = config();
        let args = ExportArgs {
            format: Some("html".to_string()),
            output_dir: Some(PathBuf::from("out")),
            concurrency: Some(8),
            tags: vec!["stoic".to_string()],
            profiles: vec!["student".to_string()],
            verify: true,
            ..Default::default()
        };

        args.apply_overrides(&mut config).unwrap();
        assert_eq!(config.export.format, ExportFormat::Html);
        assert_eq!(config.export.output_dir, PathBuf::from("out"));
        assert_eq!(config.export.concurrency, 8);
        assert!(config.export.verify_output);
        assert!(config.filter.tags_any.contains("stoic"));
        assert!(config.filter.reader_profiles.contains("student"));
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let mut config = config();
        let args = ExportArgs {
            format: Some("docx".to_string()),
            ..Default::default()
        };
        assert!(args.apply_overrides(&mut config).is_err());

        let args = ExportArgs {
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(args.apply_overrides(&mut config).is_err());
    }
}
