//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for cache and data directories.

use std::path::PathBuf;

const APPLICATION: &str = "charsheet";

/// Get the platform-specific log directory
///
/// - macOS: `~/Library/Caches/charsheet/logs`
/// - Linux: `~/.cache/charsheet/logs` (or `$XDG_CACHE_HOME/charsheet/logs`)
/// - Windows: `%LOCALAPPDATA%\charsheet\cache\logs`
/// - Fallback: `/tmp/charsheet/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APPLICATION)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join(APPLICATION))
        .join("logs")
}

/// Get the data directory holding `config.toml` and `templates/`.
///
/// A `data` directory below the working directory wins, so the binary runs
/// straight from a checkout. Otherwise the platform data directory is used:
/// - macOS: `~/Library/Application Support/charsheet`
/// - Linux: `~/.local/share/charsheet` (or `$XDG_DATA_HOME/charsheet`)
/// - Windows: `%APPDATA%\charsheet\data`
pub fn data_dir() -> PathBuf {
    let local = PathBuf::from("data");
    if local.join("templates").is_dir() {
        return local;
    }
    directories::ProjectDirs::from("", "", APPLICATION)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or(local)
}
