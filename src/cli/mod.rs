//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Folio using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// The run finished but some items failed or were skipped
    pub const PARTIAL_FAILURE: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const FATAL: i32 = 5;
    /// SIGINT convention
    pub const CANCELLED: i32 = 130;
}

/// Folio - Bulk library export
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
#[command(author = "Folio Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml", env = "FOLIO_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FOLIO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the library to a new run directory
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Verify the files of a previous export against its manifest
    Verify(commands::verify::VerifyArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["folio", "export"]);
        assert_eq!(cli.config, "folio.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["folio", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["folio", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_export_overrides() {
        let cli = Cli::parse_from([
            "folio",
            "export",
            "--format",
            "pdf",
            "--concurrency",
            "4",
            "--tag",
            "stoic",
            "--tag",
            "ethics",
            "--yes",
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.format.as_deref(), Some("pdf"));
        assert_eq!(args.concurrency, Some(4));
        assert_eq!(args.tags, vec!["stoic", "ethics"]);
        assert!(args.yes);
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["folio", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_verify() {
        let cli = Cli::parse_from(["folio", "verify", "exports/run-1"]);
        let Commands::Verify(args) = cli.command else {
            panic!("expected verify command");
        };
        assert_eq!(args.dir, std::path::PathBuf::from("exports/run-1"));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["folio", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
