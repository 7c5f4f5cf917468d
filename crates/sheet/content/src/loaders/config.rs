//! Sheet configuration loader.

use std::path::Path;

use sheet_core::SheetConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for sheet configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys missing from the file keep their default values.
    pub fn load(path: &Path) -> LoadResult<SheetConfig> {
        let content = read_file(path)?;
        Self::load_str(&content)
    }

    pub fn load_str(content: &str) -> LoadResult<SheetConfig> {
        let config: SheetConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::load_str("adult_age = 16\nseparator = \"|\"\n").unwrap();
        assert_eq!(config.adult_age, 16);
        assert_eq!(config.separator, "|");
        assert_eq!(config.trait_multiple_max, SheetConfig::DEFAULT_TRAIT_MULTIPLE_MAX);
    }

    #[test]
    fn version_table_is_read() {
        let config =
            ConfigLoader::load_str("[version]\nmajor = 0\nminor = 9\n").unwrap();
        assert_eq!(config.version, sheet_core::Version::new(0, 9, 0));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(ConfigLoader::load_str("adult_age = \"old\"").is_err());
    }
}
