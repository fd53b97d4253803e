//! Locations and persistence of the CLI's configuration and credentials.

use libnexus::Config;
use libnexus::auth::{CredentialStore, Credentials, FileCredentialStore, RegistryKey};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "NEXUS_CONFIG";

/// Environment variable overriding the credentials file location.
pub const CREDENTIALS_ENV: &str = "NEXUS_CREDENTIALS";

/// Get config file path, defaulting to ~/.config/nexus/config.toml
pub fn get_config_path() -> PathBuf {
    if let Ok(config_path) = env::var(CONFIG_ENV) {
        return PathBuf::from(config_path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("nexus").join("config.toml")
    } else {
        // Fallback to current directory
        PathBuf::from("config.toml")
    }
}

/// Get credentials path, defaulting to ~/.config/nexus/credentials.toml
pub fn get_credentials_path() -> PathBuf {
    if let Ok(creds_path) = env::var(CREDENTIALS_ENV) {
        return PathBuf::from(creds_path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("nexus").join("credentials.toml")
    } else {
        PathBuf::from("credentials.toml")
    }
}

/// Loads defaults, the file at `path` when present, and `NEXUS_*` variables.
pub fn load_config(path: &Path) -> Result<Config, String> {
    Config::load(Some(path)).map_err(|e| format!("Failed to load config: {}", e))
}

/// Writes `config` to `path` as TOML, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let contents = config
        .to_toml()
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(path, contents).map_err(|e| format!("Failed to write config file: {}", e))
}

/// Stores `credentials` for the registry location `key`.
pub fn save_credentials(path: &Path, key: &RegistryKey, credentials: &Credentials) -> Result<(), String> {
    let mut store = FileCredentialStore::open(path)
        .map_err(|e| format!("Failed to open credential store: {}", e))?;

    store
        .store(key, credentials)
        .map_err(|e| format!("Failed to store credentials: {}", e))
}

/// Drops the credentials stored for exactly `key`. Returns whether there
/// were any.
pub fn forget_credentials(path: &Path, key: &RegistryKey) -> Result<bool, String> {
    let mut store = FileCredentialStore::open(path)
        .map_err(|e| format!("Failed to open credential store: {}", e))?;

    store
        .remove(key)
        .map_err(|e| format!("Failed to remove credentials: {}", e))
}

/// Credentials stored for `key`, or `None` when there are none or the store
/// cannot be read.
pub fn load_credentials(path: &Path, key: &RegistryKey) -> Option<Credentials> {
    if key.host().is_empty() || !path.exists() {
        return None;
    }

    match FileCredentialStore::open(path).and_then(|store| store.get(key)) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable credential store");
            None
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
