//! Configuration schema types
//!
//! This module defines the configuration structure for Folio. Every section
//! has defaults except `[library]`, which must name the snapshot to export.

use crate::core::export::CancelPolicy;
use crate::core::format::ExportFormat;
use crate::domain::filter::BulkExportFilterContext;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound for `export.concurrency`
pub const MAX_CONCURRENCY: usize = 32;

/// Main Folio configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Library snapshot location
    pub library: LibraryConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Default selection applied to every export
    #[serde(default)]
    pub filter: BulkExportFilterContext,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FolioConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.library.validate()?;
        self.export.validate()?;
        self.filter
            .validate()
            .map_err(|e| format!("Invalid [filter] section: {e}"))?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Library snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path to the JSON library snapshot
    pub path: PathBuf,

    /// Base directory for file-backed item content
    ///
    /// Defaults to the directory containing the snapshot.
    #[serde(default)]
    pub content_root: Option<PathBuf>,
}

impl LibraryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("library.path cannot be empty".to_string());
        }
        if matches!(&self.content_root, Some(root) if root.as_os_str().is_empty()) {
            return Err("library.content_root cannot be empty when set".to_string());
        }
        Ok(())
    }

    /// Directory that relative content paths resolve against
    pub fn resolved_content_root(&self) -> PathBuf {
        match &self.content_root {
            Some(root) => root.clone(),
            None => self
                .path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Base directory under which each run creates its own output directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output format (text, markdown, json, html, pdf)
    #[serde(default)]
    pub format: ExportFormat,

    /// Maximum number of items processed at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-item processing timeout in seconds (0 disables the timeout)
    #[serde(default = "default_item_timeout_secs")]
    pub item_timeout_secs: u64,

    /// What happens to in-flight items when a run is cancelled
    #[serde(default)]
    pub cancel_policy: CancelPolicy,

    /// Prefix of each run's output directory name
    #[serde(default = "default_directory_prefix")]
    pub directory_prefix: String,

    /// Re-read written files and compare checksums after the run
    #[serde(default)]
    pub verify_output: bool,

    /// Maximum length of a sanitized file name stem
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Fail guides whose quality score is below this percentage
    #[serde(default)]
    pub min_quality_score: Option<f64>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.as_os_str().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }

        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(format!(
                "export.concurrency must be between 1 and {MAX_CONCURRENCY}"
            ));
        }

        if self.directory_prefix.is_empty()
            || !self
                .directory_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "Invalid export.directory_prefix '{}'. Use letters, digits, '-' or '_'",
                self.directory_prefix
            ));
        }

        if !(8..=200).contains(&self.max_title_length) {
            return Err("export.max_title_length must be between 8 and 200".to_string());
        }

        if let Some(score) = self.min_quality_score {
            if !(0.0..=100.0).contains(&score) {
                return Err("export.min_quality_score must be between 0 and 100".to_string());
            }
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: ExportFormat::default(),
            concurrency: default_concurrency(),
            item_timeout_secs: default_item_timeout_secs(),
            cancel_policy: CancelPolicy::default(),
            directory_prefix: default_directory_prefix(),
            verify_output: false,
            max_title_length: default_max_title_length(),
            min_quality_score: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_concurrency() -> usize {
    3
}

fn default_item_timeout_secs() -> u64 {
    120
}

fn default_directory_prefix() -> String {
    "folio-export".to_string()
}

fn default_max_title_length() -> usize {
    100
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> LibraryConfig {
        LibraryConfig {
            path: PathBuf::from("library/library.json"),
            content_root: None,
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_config_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.item_timeout_secs, 120);
        assert_eq!(config.format, ExportFormat::Markdown);
        assert_eq!(config.cancel_policy, CancelPolicy::FinishInFlight);
        assert_eq!(config.directory_prefix, "folio-export");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_export_config_concurrency_bounds() {
        let mut config = ExportConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.concurrency = MAX_CONCURRENCY;
        assert!(config.validate().is_ok());

        config.concurrency = MAX_CONCURRENCY + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_config_directory_prefix() {
        let mut config = ExportConfig {
            directory_prefix: "../escape".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.directory_prefix = "study_guides-2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_export_config_quality_score_range() {
        let config = ExportConfig {
            min_quality_score: Some(120.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_path = String::new();
        assert!(config.validate().is_err());

        config.local_enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_content_root_defaults_to_snapshot_directory() {
        assert_eq!(library().resolved_content_root(), PathBuf::from("library"));

        let explicit = LibraryConfig {
            content_root: Some(PathBuf::from("/srv/guides")),
            ..library()
        };
        assert_eq!(
            explicit.resolved_content_root(),
            PathBuf::from("/srv/guides")
        );
    }

    #[test]
    fn test_full_config_validation_includes_filter() {
        let mut config = FolioConfig {
            application: ApplicationConfig::default(),
            library: library(),
            export: ExportConfig::default(),
            filter: BulkExportFilterContext::default(),
            logging: LoggingConfig::default(),
        };
        assert!(config.validate().is_ok());

        config.filter.title_contains = Some(" ".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.contains("[filter]"));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: FolioConfig = toml::from_str(
            r#"
[library]
path = "library.json"

[export]
format = "pdf"
cancel_policy = "abandon_in_flight"
"#,
        )
        .unwrap();

        assert_eq!(config.export.format, ExportFormat::Pdf);
        assert_eq!(config.export.cancel_policy, CancelPolicy::AbandonInFlight);
        assert_eq!(config.export.concurrency, 3);
        assert!(config.logging.local_enabled);
    }
}
