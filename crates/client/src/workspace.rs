//! Loaded rule content shared by every command.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use sheet_content::{CharacterReader, CharacterWriter, ContentFactory};
use sheet_core::{Character, SheetConfig, SheetError, Template};

/// Configuration and merged template from one data directory.
pub struct Workspace {
    pub config: SheetConfig,
    pub template: Arc<Template>,
}

impl Workspace {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let factory = ContentFactory::new(data_dir);
        let config = factory.load_config()?;
        let loaded = factory
            .load_template(&config)
            .with_context(|| format!("Failed to load templates from {}", data_dir.display()))?;

        for warning in &loaded.warnings {
            eprintln!(
                "{} {}: {}",
                style("!").yellow().bold(),
                warning.source,
                warning.warning
            );
        }

        Ok(Self {
            config,
            template: Arc::new(loaded.template),
        })
    }

    /// A character at its reset defaults.
    pub fn new_character(&self) -> Result<Character> {
        Character::new(Arc::clone(&self.template), self.config.clone())
            .context("Template is missing traits the sheet needs")
    }

    /// Reads a character document.
    pub fn open(&self, path: &Path) -> Result<Character> {
        let mut character = self.new_character()?;
        let report = CharacterReader::read(path, &mut character)
            .inspect_err(|e| {
                tracing::error!(
                    code = e.error_code(),
                    severity = %e.severity(),
                    "{e}"
                );
                if e.severity().is_recoverable() {
                    eprintln!("{} check the path and permissions", style("hint:").dim());
                }
            })
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if let Some(warning) = &report.version_warning {
            eprintln!("{} {}", style("!").yellow().bold(), warning);
        }
        if report.traits_skipped > 0 {
            eprintln!(
                "{} {} saved trait(s) have no match in the current templates and were dropped",
                style("!").yellow().bold(),
                report.traits_skipped
            );
        }
        Ok(character)
    }

    pub fn save(character: &mut Character, path: &Path) -> Result<()> {
        CharacterWriter::write(character, path)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
