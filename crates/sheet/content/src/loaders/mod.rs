//! Content loaders for reading sheet data from files.
//!
//! Rule templates come from XML documents, the sheet configuration from TOML.

pub mod config;
pub mod factory;
pub mod template;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use template::{LoadedTemplate, TemplateLoader, TemplateWarning};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
