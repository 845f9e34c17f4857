//! Configuration discovery and parsing.
//!
//! # Design
//! - Discovery follows the XDG user/system locations, then the legacy dot
//!   directory, then `/etc`. The first existing file wins.
//! - A missing file is not fatal: built-in defaults are used with a warning.
//!   An explicitly requested file that does not exist is an error.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::defaults::{CONFIG_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILE_NAME};
use crate::error::{ConfigError, ConfigResult};
use crate::model::LeverConfig;
use crate::validate::validate_config;

/// A validated configuration together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Parsed and validated configuration.
    pub config: LeverConfig,
    /// Source file, or `None` when built-in defaults were used.
    pub source: Option<PathBuf>,
}

/// Ordered list of locations searched when no explicit file is given.
#[must_use]
pub fn candidate_paths(home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(4);
    if let Some(home) = home {
        paths.push(
            home.join(".config")
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }
    paths.push(
        Path::new("/etc/xdg")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    );
    if let Some(home) = home {
        paths.push(
            home.join(format!(".{CONFIG_DIR_NAME}"))
                .join(CONFIG_FILE_NAME),
        );
    }
    paths.push(Path::new("/etc").join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    paths
}

/// Return the first existing candidate path.
#[must_use]
pub fn discover(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

/// Read, parse and validate a configuration file.
///
/// # Errors
///
/// Returns an error when the file cannot be read, is not valid JSON for the
/// expected shape, or violates a configuration invariant.
pub fn load_from_path(path: &Path) -> ConfigResult<LeverConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    let config: LeverConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Resolve and load configuration.
///
/// Precedence: `explicit`, then `$TLEVER_CONFIG`, then the discovery
/// locations under the current user's home directory and `/etc`.
///
/// # Errors
///
/// Returns an error when an explicitly requested file cannot be loaded, or
/// when a discovered file is invalid.
pub fn load(explicit: Option<&Path>) -> ConfigResult<LoadedConfig> {
    let env_override = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let home = dirs::home_dir();
    load_with(explicit, env_override.as_deref(), &candidate_paths(home.as_deref()))
}

pub(crate) fn load_with(
    explicit: Option<&Path>,
    env_override: Option<&Path>,
    candidates: &[PathBuf],
) -> ConfigResult<LoadedConfig> {
    if let Some(path) = explicit.or(env_override) {
        debug!(path = %path.display(), "loading requested configuration file");
        let config = load_from_path(path)?;
        return Ok(LoadedConfig {
            config,
            source: Some(path.to_path_buf()),
        });
    }

    if let Some(path) = discover(candidates) {
        debug!(path = %path.display(), "loading discovered configuration file");
        let config = load_from_path(&path)?;
        return Ok(LoadedConfig {
            config,
            source: Some(path),
        });
    }

    warn!("configuration file not found, using default values");
    Ok(LoadedConfig {
        config: LeverConfig::default(),
        source: None,
    })
}
