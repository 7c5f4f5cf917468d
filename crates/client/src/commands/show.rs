//! Print a character sheet.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;
use sheet_core::{Character, DerivedKind, GroupKind, TraitType};

use crate::workspace::Workspace;

/// Show identity, rated traits and derived attributes
#[derive(Parser, Debug)]
pub struct Show {
    /// Character document to show
    pub file: PathBuf,
}

impl Show {
    pub fn execute(self, workspace: &Workspace) -> Result<()> {
        let character = workspace.open(&self.file)?;

        print_header(&character);
        print_traits(&character);
        print_derived(&character);
        print_unavailable(&character);
        Ok(())
    }
}

fn print_header(character: &Character) {
    let name = character.identity().display_name();
    let name = if name.is_empty() { "(unnamed)".to_string() } else { name };
    println!("{}", style(name).bold().underlined());
    println!(
        "  {} {}, {} years, {} era",
        style("Species:").dim(),
        character.species(),
        character.age(),
        character.era()
    );
    println!(
        "  {} {} / {}",
        style("Virtue / Vice:").dim(),
        character.virtue(),
        character.vice()
    );
    for kind in GroupKind::ALL {
        let group = character.group(kind);
        if !group.is_empty() {
            println!("  {} {}", style(format!("{kind}:")).dim(), group);
        }
    }
    println!(
        "  {} {}   {} {}",
        style("Powerstat:").dim(),
        character.powerstat(),
        style("Morality:").dim(),
        character.morality()
    );
    for (level, derangement) in character.derangements() {
        println!("  {} {} ({})", style("Derangement:").dim(), derangement, level);
    }
    println!();
}

/// Rated traits that apply to the character in its current state.
fn print_traits(character: &Character) {
    let mut current: Option<TraitType> = None;
    for (_, entry) in character.applicable_traits().filter(|(_, t)| t.value() != 0) {
        if current != Some(entry.trait_type()) {
            println!("{}", style(entry.trait_type()).yellow().bold());
            current = Some(entry.trait_type());
        }

        let mut line = format!("  {:<28} {}", entry.name(), dots(entry.value()));
        if !entry.custom_text().is_empty() {
            line.push_str(&format!(" ({})", entry.custom_text()));
        }
        if !entry.specialties().is_empty() {
            line.push_str(&format!(" [{}]", entry.specialties().join(", ")));
        }
        println!("{line}");
    }
    println!();
}

fn print_derived(character: &Character) {
    let values = character.derived_values();
    println!("{}", style("Derived").yellow().bold());
    for kind in DerivedKind::ALL {
        println!("  {:<28} {}", kind.to_string(), values.get(kind));
    }
}

/// Purchased traits whose prerequisites no longer hold.
fn print_unavailable(character: &Character) {
    let unavailable: Vec<_> = character
        .applicable_traits()
        .filter(|(_, t)| t.value() > 0 && !t.is_available())
        .collect();
    if unavailable.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Prerequisites not met").red().bold());
    for (_, entry) in unavailable {
        println!(
            "  {:<28} {}",
            entry.name(),
            style(entry.prerequisites().unwrap_or_default()).dim()
        );
    }
}

fn dots(value: i32) -> String {
    "●".repeat(value.max(0) as usize)
}
