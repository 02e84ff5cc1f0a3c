//! # Configuration Loader
//!
//! Reads the TOML configuration file and maps it onto the `AppConfig` DTO.
//!
//! No validation and no defaults happen here: empty or missing values are
//! passed through as facts and resolved in [`super::wiring`].

use anyhow::Context;
use std::path::{Path, PathBuf};
use vf_core::config::AppConfig;

pub const CONFIG_ENV_VAR: &str = "VERIFYFLOW_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read (I/O error)
/// - Content is not valid TOML (parse error)
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// Config file location: `$VERIFYFLOW_CONFIG`, else `config.toml` in the
/// platform data directory. `None` when neither is available.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let candidate = dirs::data_local_dir()?
        .join(super::wiring::APP_DIR_NAME)
        .join(CONFIG_FILE_NAME);
    candidate.exists().then_some(candidate)
}
