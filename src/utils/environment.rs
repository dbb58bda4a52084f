use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Overrides the data directory holding the history record
pub const DATA_DIR_ENV: &str = "QRFORGE_DATA_DIR";

/// Overrides the settings file path
pub const CONFIG_ENV: &str = "QRFORGE_CONFIG";

const APP_DIR: &str = "qrforge";
const SETTINGS_FILE: &str = "settings.json";

/// Directory holding persisted records (`$QRFORGE_DATA_DIR`, else the platform data dir)
pub fn data_dir() -> Result<PathBuf> {
    resolve(DATA_DIR_ENV, dirs::data_dir().map(|d| d.join(APP_DIR)))
        .context("Could not determine data directory; set QRFORGE_DATA_DIR")
}

/// Settings file (`$QRFORGE_CONFIG`, else `<config dir>/qrforge/settings.json`)
pub fn config_path() -> Result<PathBuf> {
    resolve(CONFIG_ENV, dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE)))
        .context("Could not determine config directory; set QRFORGE_CONFIG")
}

fn resolve(var: &str, fallback: Option<PathBuf>) -> Option<PathBuf> {
    match env::var_os(var) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => fallback,
    }
}

/// Replace the home directory prefix with `~` for display
pub fn format_path_with_tilde(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
