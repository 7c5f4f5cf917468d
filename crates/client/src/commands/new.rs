//! Create a fresh character document.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use crate::workspace::Workspace;

/// Create a new character at its default values
#[derive(Parser, Debug)]
pub struct New {
    /// Species of the new character (defaults to the configured species)
    #[arg(short, long)]
    pub species: Option<String>,

    /// Where to write the character document
    #[arg(short, long)]
    pub out: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl New {
    pub fn execute(self, workspace: &Workspace) -> Result<()> {
        if self.out.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.out.display()
            );
        }

        let mut character = workspace.new_character()?;
        if let Some(species) = &self.species {
            if workspace.template.species(species).is_none() {
                let known: Vec<_> = workspace.template.species_names().collect();
                anyhow::bail!("Unknown species '{species}' (known: {})", known.join(", "));
            }
            character.set_species(species);
        }

        Workspace::save(&mut character, &self.out)?;
        println!(
            "{} Created {} character {}",
            style("✓").green(),
            style(character.species()).cyan(),
            style(self.out.display()).bold()
        );
        Ok(())
    }
}
