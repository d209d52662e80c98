//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "folio.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Folio configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIG_ERROR);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [library] path at your library snapshot (JSON)");
                println!("  2. Adjust [export] and [filter] to taste");
                println!("  3. Validate configuration: folio validate-config");
                println!("  4. Run export: folio export");
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_code::FATAL)
            }
        }
    }

    /// Sample configuration with every section documented
    pub fn sample_config() -> &'static str {
        r#"# Folio Configuration File
# Values may reference environment variables as ${VAR}.
# Any key can be overridden with FOLIO_<SECTION>_<KEY>, e.g. FOLIO_EXPORT_FORMAT=pdf

[application]
log_level = "info"  # trace | debug | info | warn | error

[library]
# Library snapshot: a JSON array of items
path = "library.json"
# Base directory for file-backed content (defaults to the snapshot's directory)
# content_root = "${HOME}/guides"

[export]
output_dir = "exports"
format = "markdown"  # text | markdown | json | html | pdf
concurrency = 3  # 1-32
item_timeout_secs = 120  # 0 disables the timeout
cancel_policy = "finish_in_flight"  # finish_in_flight | abandon_in_flight
directory_prefix = "folio-export"
verify_output = false
max_title_length = 100
# min_quality_score = 95.0

[filter]
# reader_profiles = ["student"]
# summary_types = ["full"]
# tags_any = ["philosophy"]
# tags_all = []
# created_after = "2024-01-01T00:00:00Z"
# created_before = "2025-01-01T00:00:00Z"
# title_contains = "ethics"
sort = "library"  # library | title | created_at

[logging]
local_enabled = true
local_path = "logs"
local_rotation = "daily"  # daily | hourly | never
"#
    }
}
