//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Folio configuration file.

use crate::cli::exit_code;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates every section
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(exit_code::CONFIG_ERROR);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Library: {}", config.library.path.display());
        println!(
            "  Content Root: {}",
            config.library.resolved_content_root().display()
        );
        println!("  Output Directory: {}", config.export.output_dir.display());
        println!("  Format: {}", config.export.format);
        println!("  Concurrency: {}", config.export.concurrency);
        match config.export.item_timeout_secs {
            0 => println!("  Item Timeout: none"),
            secs => println!("  Item Timeout: {secs}s"),
        }
        println!("  Cancel Policy: {}", config.export.cancel_policy);
        println!("  Verify Output: {}", config.export.verify_output);
        if let Some(score) = config.export.min_quality_score {
            println!("  Minimum Quality Score: {score:.1}%");
        }
        println!();
        Ok(exit_code::SUCCESS)
    }
}
