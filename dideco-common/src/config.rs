//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// File name of the authoritative (read-write) database inside the data folder
pub const SOCIAL_DB_FILE: &str = "dideco.db";

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `DIDECO_DATA` environment variable
/// 3. TOML config file (`data_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("DIDECO_DATA") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// Procurement ledger database path, if configured.
///
/// Resolution: CLI argument, then `DIDECO_PROCUREMENT_DB` environment
/// variable, then `procurement_db` in the config file. The ledger is owned
/// by the acquisitions system; absence just disables the one-shot import.
pub fn resolve_procurement_db(cli_arg: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var("DIDECO_PROCUREMENT_DB") {
        return Some(PathBuf::from(path));
    }
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(path) = config.get("procurement_db").and_then(|v| v.as_str()) {
                    return Some(PathBuf::from(path));
                }
            }
        }
    }
    None
}

/// Path of the authoritative database inside a data folder
pub fn database_path(data_folder: &Path) -> PathBuf {
    data_folder.join(SOCIAL_DB_FILE)
}

/// Ensure the data folder exists before opening the database
pub fn ensure_data_folder(data_folder: &Path) -> Result<()> {
    std::fs::create_dir_all(data_folder)?;
    Ok(())
}

/// Get configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/dideco/config.toml first, then /etc/dideco/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("dideco").join("config.toml"));
        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/dideco/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("dideco").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("dideco"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/dideco"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("dideco"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/dideco"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("dideco"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\dideco"))
    } else {
        PathBuf::from("./dideco_data")
    }
}
