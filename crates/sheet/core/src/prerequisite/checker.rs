//! Full-rescan availability checker.

use std::collections::BTreeMap;

use crate::prerequisite::{Expr, PrerequisiteError, TraitLookup, compile, evaluate};
use crate::state::{TraitEvent, TraitId, TraitStore, TraitType};

impl TraitStore {
    /// Slots answering a name reference: all slots of the first matching type.
    fn referenced(&self, trait_type: Option<TraitType>, name: &str) -> Vec<TraitId> {
        let ids = self.ids_named(name);
        let wanted = match trait_type {
            Some(t) => t,
            None => match ids.first().and_then(|id| self.get(*id).ok()) {
                Some(t) => t.trait_type(),
                None => return Vec::new(),
            },
        };
        ids.iter()
            .copied()
            .filter(|id| self.get(*id).is_ok_and(|t| t.trait_type() == wanted))
            .collect()
    }
}

impl TraitLookup for TraitStore {
    fn names(&self) -> Vec<(&str, TraitType)> {
        let mut names = Vec::new();
        for (name, ids) in self.names_longest_first() {
            let mut types: Vec<TraitType> = ids
                .iter()
                .filter_map(|id| self.get(*id).ok().map(|t| t.trait_type()))
                .collect();
            types.dedup();
            names.extend(types.into_iter().map(|t| (name, t)));
        }
        names
    }

    fn value_of(&self, trait_type: Option<TraitType>, name: &str) -> Option<i32> {
        self.referenced(trait_type, name)
            .into_iter()
            .filter_map(|id| self.get(id).ok().map(|t| t.value()))
            .max()
    }

    fn has_specialty(
        &self,
        trait_type: Option<TraitType>,
        name: &str,
        specialty: &str,
    ) -> Option<bool> {
        let ids = self.referenced(trait_type, name);
        if ids.is_empty() {
            return None;
        }
        Some(
            ids.into_iter()
                .any(|id| self.get(id).is_ok_and(|t| t.has_specialty(specialty))),
        )
    }
}

/// Recomputes `available` for every trait that declares prerequisites.
///
/// Compiled expressions are cached per trait; the name set a store answers
/// to never changes after construction.
#[derive(Clone, Debug, Default)]
pub struct PrerequisiteChecker {
    powerstat_identifier: String,
    compiled: BTreeMap<TraitId, Result<Expr, PrerequisiteError>>,
}

impl PrerequisiteChecker {
    pub fn new(powerstat_identifier: impl Into<String>) -> Self {
        Self {
            powerstat_identifier: powerstat_identifier.into(),
            compiled: BTreeMap::new(),
        }
    }

    /// Evaluates one trait's prerequisites. Traits without any are available.
    pub fn check(&mut self, store: &TraitStore, id: TraitId, powerstat: i32) -> bool {
        let Ok(entry) = store.get(id) else {
            return false;
        };
        let Some(text) = entry.prerequisites() else {
            return true;
        };

        let compiled = self.compiled.entry(id).or_insert_with(|| {
            let result = compile(text, store, &self.powerstat_identifier);
            if let Err(error) = &result {
                tracing::warn!(
                    target: "sheet_core::prerequisite",
                    trait_name = entry.name(),
                    expression = text,
                    %error,
                    "malformed prerequisite, trait marked unavailable"
                );
            }
            result
        });

        let expr = match compiled {
            Ok(expr) => expr,
            Err(_) => return false,
        };
        match evaluate(expr, store, powerstat) {
            Ok(value) => value != 0,
            Err(error) => {
                tracing::warn!(
                    target: "sheet_core::prerequisite",
                    trait_name = entry.name(),
                    expression = text,
                    %error,
                    "prerequisite evaluation failed, trait marked unavailable"
                );
                false
            }
        }
    }

    /// Re-checks every trait with prerequisites and writes `available`.
    ///
    /// Only availability is written, so the rescan never triggers further
    /// value changes.
    pub fn refresh(&mut self, store: &mut TraitStore, powerstat: i32) -> Vec<(TraitId, TraitEvent)> {
        let ids: Vec<TraitId> = store.with_prerequisites().collect();
        let results: Vec<(TraitId, bool)> = ids
            .into_iter()
            .map(|id| (id, self.check(store, id, powerstat)))
            .collect();

        let mut events = Vec::new();
        for (id, available) in results {
            if let Ok(entry) = store.get_mut(id)
                && let Some(event) = entry.set_available(available)
            {
                events.push((id, event));
            }
        }
        tracing::trace!(
            target: "sheet_core::prerequisite",
            changed = events.len(),
            "prerequisites refreshed"
        );
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use crate::env::{Template, TraitDefinition};

    fn store_with(prerequisite: &str) -> (TraitStore, TraitId) {
        let mut template = Template::new();
        template.add_trait(TraitType::Attribute, "Mental", TraitDefinition::named("Wits"));
        template.add_trait(TraitType::Skill, "Mental", TraitDefinition::named("Investigation"));
        template.add_trait(TraitType::Skill, "Physical", TraitDefinition::named("Fight"));
        template.add_trait(TraitType::Skill, "Physical", TraitDefinition::named("Firefight"));
        template.add_trait(
            TraitType::Merit,
            "Mental",
            TraitDefinition::named("Language").with_custom(true),
        );
        template.add_trait(TraitType::Power, "Disciplines", TraitDefinition::named("Auspex"));
        template.add_trait(
            TraitType::Merit,
            "Test",
            TraitDefinition::named("Target").with_prerequisites(prerequisite),
        );

        let mut store = TraitStore::from_template(&template, &SheetConfig::new());
        store.reset_to_defaults();
        let target = store.lookup(TraitType::Merit, "Test", "Target").unwrap();
        (store, target)
    }

    fn set(store: &mut TraitStore, trait_type: TraitType, category: &str, name: &str, value: i32) {
        let id = store.lookup(trait_type, category, name).unwrap();
        store.get_mut(id).unwrap().set_value(value).unwrap();
    }

    fn available(store: &TraitStore, id: TraitId) -> bool {
        store.get(id).unwrap().is_available()
    }

    #[test]
    fn availability_follows_comparison() {
        let (mut store, target) = store_with("Wits > 2");
        let mut checker = PrerequisiteChecker::new("Powerstat");

        set(&mut store, TraitType::Attribute, "Mental", "Wits", 2);
        let events = checker.refresh(&mut store, 0);
        assert!(!available(&store, target));
        assert_eq!(events, vec![(target, TraitEvent::AvailabilityChanged(false))]);

        set(&mut store, TraitType::Attribute, "Mental", "Wits", 3);
        let events = checker.refresh(&mut store, 0);
        assert!(available(&store, target));
        assert_eq!(events, vec![(target, TraitEvent::AvailabilityChanged(true))]);

        // Unchanged outcome, no event.
        assert!(checker.refresh(&mut store, 0).is_empty());
    }

    #[test]
    fn malformed_expression_marks_unavailable() {
        let (mut store, target) = store_with("Wits > ");
        let mut checker = PrerequisiteChecker::new("Powerstat");
        set(&mut store, TraitType::Attribute, "Mental", "Wits", 5);

        checker.refresh(&mut store, 0);
        assert!(!available(&store, target));
    }

    #[test]
    fn unknown_name_marks_unavailable() {
        let (mut store, target) = store_with("Brawl > 1");
        let mut checker = PrerequisiteChecker::new("Powerstat");
        checker.refresh(&mut store, 0);
        assert!(!available(&store, target));
    }

    #[test]
    fn shorter_name_does_not_match_inside_longer_one() {
        let (mut store, target) = store_with("Fight > 1");
        let mut checker = PrerequisiteChecker::new("Powerstat");

        set(&mut store, TraitType::Skill, "Physical", "Firefight", 3);
        checker.refresh(&mut store, 0);
        assert!(!available(&store, target));

        set(&mut store, TraitType::Skill, "Physical", "Fight", 2);
        checker.refresh(&mut store, 0);
        assert!(available(&store, target));
    }

    #[test]
    fn specialty_reference_requires_the_specialty() {
        let (mut store, target) = store_with("Investigation.Forensics and Wits > 1");
        let mut checker = PrerequisiteChecker::new("Powerstat");
        set(&mut store, TraitType::Attribute, "Mental", "Wits", 2);
        set(&mut store, TraitType::Skill, "Mental", "Investigation", 1);

        checker.refresh(&mut store, 0);
        assert!(!available(&store, target));

        let id = store.lookup(TraitType::Skill, "Mental", "Investigation").unwrap();
        store.get_mut(id).unwrap().append_specialty("Forensics").unwrap();
        checker.refresh(&mut store, 0);
        assert!(available(&store, target));
    }

    #[test]
    fn power_stat_and_qualified_power_references() {
        let (mut store, target) = store_with("Powerstat >= 2 and (Power.Auspex > 0)");
        let mut checker = PrerequisiteChecker::new("Powerstat");
        set(&mut store, TraitType::Power, "Disciplines", "Auspex", 1);

        checker.refresh(&mut store, 1);
        assert!(!available(&store, target));
        checker.refresh(&mut store, 2);
        assert!(available(&store, target));
    }

    #[test]
    fn custom_slots_resolve_to_highest_rating() {
        let (mut store, target) = store_with("Language > 2");
        let mut checker = PrerequisiteChecker::new("Powerstat");
        let slots = store.slots(TraitType::Merit, "Mental", "Language").unwrap().to_vec();
        store.get_mut(slots[1]).unwrap().set_value(3).unwrap();

        checker.refresh(&mut store, 0);
        assert!(available(&store, target));
    }
}
