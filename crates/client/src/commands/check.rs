//! Report prerequisite status of every applicable trait that declares one.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use crate::workspace::Workspace;

/// Check trait prerequisites
#[derive(Parser, Debug)]
pub struct Check {
    /// Character document to check
    pub file: PathBuf,

    /// Only list traits whose prerequisites are not met
    #[arg(long)]
    pub failing: bool,
}

impl Check {
    pub fn execute(self, workspace: &Workspace) -> Result<()> {
        let character = workspace.open(&self.file)?;

        let mut failing = 0;
        for (_, entry) in character
            .applicable_traits()
            .filter(|(_, t)| t.has_prerequisites())
        {
            if !entry.is_available() {
                failing += 1;
            } else if self.failing {
                continue;
            }

            let mark = if entry.is_available() {
                style("✓").green()
            } else {
                style("✗").red()
            };
            println!(
                "{} {:<10} {:<28} {}",
                mark,
                entry.trait_type().to_string(),
                entry.name(),
                style(entry.prerequisites().unwrap_or_default()).dim()
            );
        }

        println!();
        println!("{failing} trait(s) with unmet prerequisites");
        Ok(())
    }
}
