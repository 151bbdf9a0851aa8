//! User settings used as a fallback for environment variables.
//!
//! Values are looked up in the process environment first and then in
//! `$HOME/.razator-utils/settings.json`, which has the shape
//! `{"env": {"DISCORD_WEBHOOK_URL": "..."}}`. A missing file behaves like
//! an empty one.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Directory under `$HOME` holding the settings file.
pub const SETTINGS_DIR: &str = ".razator-utils";

/// File name of the settings file inside [`SETTINGS_DIR`].
pub const SETTINGS_FILE: &str = "settings.json";

/// Key holding the default Discord webhook URL.
pub const DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";

/// Settings loaded from `$HOME/.razator-utils/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Fallback values for environment variables.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path(Self::settings_path()?)
    }

    /// Loads settings from `path`, returning empty settings if it does not exist.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns `$HOME/.razator-utils/settings.json`.
    pub fn settings_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    /// Looks `key` up in the environment, then in these settings.
    pub fn lookup(&self, key: &str) -> Option<String> {
        env::var(key).ok().or_else(|| self.env.get(key).cloned())
    }
}

/// Returns an environment variable, falling back to the settings file.
pub fn get_env_var(key: &str) -> Result<String> {
    if let Ok(value) = env::var(key) {
        return Ok(value);
    }

    let settings = Settings::load()
        .with_context(|| format!("Environment variable not found: {key}"))?;
    settings
        .env
        .get(key)
        .cloned()
        .ok_or_else(|| anyhow!("Environment variable not found: {key}"))
}

/// Returns the first of `keys` that resolves via [`get_env_var`].
pub fn get_env_vars(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| get_env_var(key).ok())
        .ok_or_else(|| anyhow!("None of the environment variables found: {keys:?}"))
}
