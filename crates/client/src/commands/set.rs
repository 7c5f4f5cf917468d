//! Change one trait rating and save.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use sheet_core::{SheetEvent, Topic, TraitType};

use crate::workspace::Workspace;

/// Set a trait rating and report the derived attributes it changed
#[derive(Parser, Debug)]
pub struct Set {
    /// Character document to change
    pub file: PathBuf,

    /// Trait type (attribute, skill, merit, flaw, power, subpower)
    #[arg(short = 't', long = "type")]
    pub trait_type: TraitType,

    /// Trait category, e.g. Mental
    #[arg(short, long)]
    pub category: String,

    /// Trait identifier, e.g. Wits
    #[arg(short, long)]
    pub name: String,

    /// New rating
    #[arg(short, long, allow_negative_numbers = true)]
    pub value: i32,
}

impl Set {
    pub fn execute(self, workspace: &Workspace) -> Result<()> {
        let mut character = workspace.open(&self.file)?;
        let id = character
            .lookup(self.trait_type, &self.category, &self.name)
            .with_context(|| format!("No {} named {}", self.trait_type, self.name))?;

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let subscription = character.subscribe(Topic::Derived, move |event| {
            if let SheetEvent::Derived(change) = event {
                sink.borrow_mut().push(*change);
            }
        });

        let before = character.trait_entry(id)?.value();
        character.set_trait_value(id, self.value)?;
        character.unsubscribe(subscription);

        if !character.is_modified() {
            println!("{} {} is already {}", style("·").dim(), self.name, before);
            return Ok(());
        }
        Workspace::save(&mut character, &self.file)?;

        println!(
            "{} {} {} → {}",
            style("✓").green(),
            style(&self.name).bold(),
            before,
            self.value
        );
        for change in changes.borrow().iter() {
            println!("  {} {} = {}", style("→").cyan(), change.kind, change.value);
        }
        Ok(())
    }
}
