//! Content factory for building sheet content from a data directory.

use std::path::{Path, PathBuf};

use sheet_core::SheetConfig;

use crate::loaders::{ConfigLoader, LoadResult, LoadedTemplate, TemplateLoader};

/// Content factory that loads the configuration and rule templates.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── templates/
///     ├── base.xml
///     ├── mage.xml
///     └── vampire.xml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the sheet configuration from `config.toml`.
    ///
    /// A missing file yields the built-in defaults.
    pub fn load_config(&self) -> LoadResult<SheetConfig> {
        let path = self.config_path();
        if !path.exists() {
            tracing::debug!(
                target: "sheet_content::config",
                path = %path.display(),
                "no config file, using defaults"
            );
            return Ok(SheetConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load and merge every template from `templates/`.
    pub fn load_template(&self, config: &SheetConfig) -> LoadResult<LoadedTemplate> {
        TemplateLoader::load_dir(&self.templates_dir(), config)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.data_dir.join("templates")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(factory.config_path(), Path::new("/tmp/data/config.toml"));
        assert_eq!(factory.templates_dir(), Path::new("/tmp/data/templates"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), SheetConfig::default());
    }

    #[test]
    fn missing_template_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert!(factory.load_template(&SheetConfig::default()).is_err());
    }
}
