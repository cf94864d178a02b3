//! Configuration loading and discovery for `questcard.toml`
//!
//! Provides functions to find, load, and override configuration.

use super::schema::QuestcardConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for.
pub const CONFIG_FILE: &str = "questcard.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse questcard.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", bullet_list(.0))]
    Validation(Vec<String>),
}

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n")
}

fn validated(config: QuestcardConfig) -> Result<QuestcardConfig, ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override upscale factor
    pub upscale: Option<u32>,
    /// Override catalog path
    pub catalog: Option<PathBuf>,
}

/// Find questcard.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for questcard.toml
/// 2. Check XDG_CONFIG_HOME/questcard/questcard.toml
///    (or ~/.config/questcard/questcard.toml)
///
/// # Returns
/// - `Some(path)` if a questcard.toml was found
/// - `None` if no config file exists in either location
///
/// # Example
/// ```ignore
/// if let Some(config_path) = find_config() {
///     println!("Using config from {}", config_path.display());
/// }
/// ```
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find questcard.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("questcard").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find questcard.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a questcard.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the defaults.
///
/// # Arguments
///
/// * `path` - Optional explicit path to the config file
///
/// # Returns
///
/// * `Ok(QuestcardConfig)` - The loaded and validated configuration
/// * `Err(ConfigError)` - If the file cannot be read, parsed or validated
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// println!("Upscale: {}", config.render.upscale);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<QuestcardConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            load_config_file(&p)
        }
        None => Ok(QuestcardConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<QuestcardConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration text.
///
/// Missing sections and keys take their defaults.
///
/// # Returns
///
/// * `Ok(QuestcardConfig)` - The parsed configuration
/// * `Err(ConfigError::Parse)` - If the text is not valid TOML for the schema
/// * `Err(ConfigError::Validation)` - With every failed check, not just the first
///
/// # Example
/// ```ignore
/// let config = parse_config("[render]\nupscale = 3\n")?;
/// assert_eq!(config.render.upscale, 3);
/// ```
pub fn parse_config(contents: &str) -> Result<QuestcardConfig, ConfigError> {
    let config: QuestcardConfig = toml::from_str(contents)?;
    validated(config)
}

/// Apply CLI overrides on top of a loaded configuration.
///
/// The result is validated again, so an override can be rejected even when
/// the file itself was fine.
///
/// # Arguments
///
/// * `config` - The configuration returned by [`load_config`]
/// * `overrides` - Values given on the command line
///
/// # Example
/// ```ignore
/// let overrides = CliOverrides { upscale: Some(3), ..CliOverrides::default() };
/// let config = merge_cli_overrides(load_config(None)?, &overrides)?;
/// ```
pub fn merge_cli_overrides(
    mut config: QuestcardConfig,
    overrides: &CliOverrides,
) -> Result<QuestcardConfig, ConfigError> {
    if let Some(upscale) = overrides.upscale {
        config.render.upscale = upscale;
    }
    if let Some(catalog) = &overrides.catalog {
        config.paths.catalog = catalog.clone();
    }

    validated(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_from_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();

        assert_eq!(find_config_from(nested), Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[render]\nupscale = 3\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.render.upscale, 3);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("[render\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = parse_config("[layout]\nrow_length = 0\n").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Config validation failed:"));
        assert!(message.contains("  - layout.row_length: must be at least 1"));
    }

    #[test]
    fn test_cli_overrides() {
        let overrides = CliOverrides {
            upscale: Some(2),
            catalog: Some(PathBuf::from("other.json")),
        };
        let config = merge_cli_overrides(QuestcardConfig::default(), &overrides).unwrap();
        assert_eq!(config.render.upscale, 2);
        assert_eq!(config.paths.catalog, PathBuf::from("other.json"));

        let zero = CliOverrides { upscale: Some(0), ..CliOverrides::default() };
        assert!(merge_cli_overrides(QuestcardConfig::default(), &zero).is_err());
    }
}
