//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FolioConfig;
use crate::domain::errors::FolioError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FolioConfig
/// 4. Applies environment variable overrides (FOLIO_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`FolioError::Configuration`] if the file cannot be read or parsed,
/// a referenced environment variable is unset, an override has an invalid
/// value, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use folio::config::loader::load_config;
///
/// let config = load_config("folio.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FolioConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FolioError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FolioError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Applies the same substitution, overrides, and validation as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<FolioConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FolioConfig = toml::from_str(&contents)
        .map_err(|e| FolioError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FolioError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("environment variable pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FolioError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| FolioError::Configuration(format!("Invalid value for {name}: {e}")))
}

/// Applies environment variable overrides using FOLIO_* prefix
///
/// Environment variables follow the pattern: FOLIO_<SECTION>_<KEY>
/// For example: FOLIO_EXPORT_FORMAT, FOLIO_LIBRARY_PATH
fn apply_env_overrides(config: &mut FolioConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("FOLIO_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Library overrides
    if let Ok(val) = std::env::var("FOLIO_LIBRARY_PATH") {
        config.library.path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("FOLIO_LIBRARY_CONTENT_ROOT") {
        config.library.content_root = Some(PathBuf::from(val));
    }

    // Export overrides
    if let Ok(val) = std::env::var("FOLIO_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_FORMAT") {
        config.export.format = parse_override("FOLIO_EXPORT_FORMAT", &val)?;
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_CONCURRENCY") {
        config.export.concurrency = parse_override("FOLIO_EXPORT_CONCURRENCY", &val)?;
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_ITEM_TIMEOUT_SECS") {
        config.export.item_timeout_secs = parse_override("FOLIO_EXPORT_ITEM_TIMEOUT_SECS", &val)?;
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_CANCEL_POLICY") {
        config.export.cancel_policy = parse_override("FOLIO_EXPORT_CANCEL_POLICY", &val)?;
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_DIRECTORY_PREFIX") {
        config.export.directory_prefix = val;
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_VERIFY_OUTPUT") {
        config.export.verify_output = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FOLIO_EXPORT_MIN_QUALITY_SCORE") {
        config.export.min_quality_score =
            Some(parse_override("FOLIO_EXPORT_MIN_QUALITY_SCORE", &val)?);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FOLIO_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("FOLIO_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("FOLIO_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
