//! Client runtime configuration.

use std::env;
use std::path::PathBuf;

use crate::dirs;

/// Settings for one `charsheet` invocation.
///
/// Sheet rules live in `config.toml` inside the data directory; this only
/// covers where things are and how much to log.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub session_id: Option<String>,
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir(),
            log_dir: dirs::log_dir(),
            session_id: None,
            log_level: "warn".to_string(),
        }
    }
}

impl ClientConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CHARSHEET_DATA_DIR` - Directory with `config.toml` and `templates/`
    /// - `CHARSHEET_LOG_DIR` - Root of the per-session log directories
    /// - `CHARSHEET_SESSION_ID` - Log session name (default: timestamp)
    /// - `CHARSHEET_LOG_LEVEL` - Default log level (default: warn)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("CHARSHEET_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Some(dir) = read_env::<PathBuf>("CHARSHEET_LOG_DIR") {
            config.log_dir = dir;
        }
        config.session_id = read_env::<String>("CHARSHEET_SESSION_ID");
        if let Some(level) = read_env::<String>("CHARSHEET_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    #[must_use]
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.log_level = level;
        }
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok().filter(|v| !v.is_empty())?.parse().ok()
}
