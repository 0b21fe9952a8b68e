use std::path::{Path, PathBuf};

use log::info;

use crate::config::schema::{validate_settings, Settings};
use crate::error::ConfigError;

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_settings_from_str(&content)
}

pub fn load_settings_from_str(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_json::from_str(content)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Loads settings from the default location, falling back to defaults
/// when no settings file exists yet. A malformed file is still an
/// error: silently ignoring a typo'd config would be worse.
pub fn load_or_default() -> Result<Settings, ConfigError> {
    match settings_path() {
        Some(path) if path.exists() => {
            info!("Loading settings from {}", path.display());
            load_settings(path)
        }
        _ => Ok(Settings::default()),
    }
}

/// Platform settings file location.
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quizforge").join("settings.json"))
}

/// Default question bank location when the settings do not name one.
pub fn default_bank_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("quizforge").join("questions.json"))
}
