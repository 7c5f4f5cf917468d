//! Arena of a character's traits, indexed by type, category and identifier.
//!
//! The store is seeded once from a [`Template`] and never gains or loses
//! entries afterwards. Custom-text traits occupy several slots under the same
//! key; every other key maps to exactly one slot.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SheetConfig;
use crate::env::Template;
use crate::state::{StoreError, Trait, TraitEvent, TraitType};

/// Stable handle to a trait inside one [`TraitStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitId(pub u32);

impl TraitId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for TraitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Index = BTreeMap<TraitType, BTreeMap<String, BTreeMap<String, Vec<TraitId>>>>;

/// Per-character trait storage.
#[derive(Clone, Debug)]
pub struct TraitStore {
    traits: Vec<Trait>,
    index: Index,
    /// Template names, longest first, with every slot carrying that name.
    names: Vec<(String, Vec<TraitId>)>,
}

impl TraitStore {
    /// Instantiates every template definition.
    ///
    /// Ordinary traits get one slot, custom-text traits get
    /// `config.trait_multiple_max` slots. Every slot starts at
    /// `config.initial_trait_value`.
    pub fn from_template(template: &Template, config: &SheetConfig) -> Self {
        let mut traits = Vec::with_capacity(template.trait_count());
        let mut index = Index::new();

        for (trait_type, category, definition) in template.definitions() {
            let slots = if definition.custom {
                config.trait_multiple_max.max(1)
            } else {
                1
            };
            let ids = index
                .entry(trait_type)
                .or_default()
                .entry(category.to_string())
                .or_default()
                .entry(definition.identifier.clone())
                .or_default();

            for _ in 0..slots {
                ids.push(TraitId(traits.len() as u32));
                traits.push(Trait::from_definition(
                    trait_type,
                    category,
                    definition,
                    config.trait_value_max,
                    config.initial_trait_value,
                ));
            }
        }

        let names = name_table(&traits);
        tracing::debug!(
            target: "sheet_core::store",
            traits = traits.len(),
            names = names.len(),
            "trait store seeded"
        );

        Self {
            traits,
            index,
            names,
        }
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn get(&self, id: TraitId) -> Result<&Trait, StoreError> {
        self.traits
            .get(id.index())
            .ok_or(StoreError::InvalidId(id.0))
    }

    /// Direct mutable access. Callers are responsible for publishing the
    /// returned events and refreshing dependents; `Character` does both.
    pub fn get_mut(&mut self, id: TraitId) -> Result<&mut Trait, StoreError> {
        self.traits
            .get_mut(id.index())
            .ok_or(StoreError::InvalidId(id.0))
    }

    /// All slots of a key.
    pub fn slots(
        &self,
        trait_type: TraitType,
        category: &str,
        identifier: &str,
    ) -> Result<&[TraitId], StoreError> {
        self.index
            .get(&trait_type)
            .and_then(|c| c.get(category))
            .and_then(|i| i.get(identifier))
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::UnknownTrait {
                trait_type,
                category: category.to_string(),
                identifier: identifier.to_string(),
            })
    }

    /// First slot of a key.
    pub fn lookup(
        &self,
        trait_type: TraitType,
        category: &str,
        identifier: &str,
    ) -> Result<TraitId, StoreError> {
        self.slots(trait_type, category, identifier)?
            .first()
            .copied()
            .ok_or_else(|| StoreError::UnknownTrait {
                trait_type,
                category: category.to_string(),
                identifier: identifier.to_string(),
            })
    }

    /// Category names of a type in template order.
    pub fn categories(&self, trait_type: TraitType) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for t in self.traits.iter().filter(|t| t.trait_type() == trait_type) {
            if !seen.contains(&t.category()) {
                seen.push(t.category());
            }
        }
        seen
    }

    /// Finds the slot a saved record should be written into.
    ///
    /// Slots are matched by display name. A slot whose custom text is set
    /// and differs from `custom_text` is taken by another record and skipped,
    /// as is any slot in `claimed`.
    pub fn find_by_name(
        &self,
        trait_type: TraitType,
        category: &str,
        name: &str,
        custom_text: Option<&str>,
        claimed: &BTreeSet<TraitId>,
    ) -> Option<TraitId> {
        let identifiers = self.index.get(&trait_type)?.get(category)?;
        let wanted = custom_text.unwrap_or_default();

        identifiers
            .values()
            .flatten()
            .copied()
            .filter(|id| !claimed.contains(id))
            .filter(|id| {
                let t = &self.traits[id.index()];
                t.name() == name && (t.custom_text().is_empty() || t.custom_text() == wanted)
            })
            // Prefer the slot already holding this text over a free one.
            .min_by_key(|id| (self.traits[id.index()].custom_text() != wanted, *id))
    }

    /// Iterates every slot in template order.
    pub fn iter(&self) -> impl Iterator<Item = (TraitId, &Trait)> {
        self.traits
            .iter()
            .enumerate()
            .map(|(i, t)| (TraitId(i as u32), t))
    }

    /// Traits worth saving: rated and either unrestricted or of `species`.
    pub fn saveable<'a>(&'a self, species: &'a str) -> impl Iterator<Item = (TraitId, &'a Trait)> {
        self.iter().filter(move |(_, t)| {
            t.value() != 0 && t.species().is_none_or(|s| s == species)
        })
    }

    /// Every slot that declares a prerequisite expression.
    pub fn with_prerequisites(&self) -> impl Iterator<Item = TraitId> + '_ {
        self.iter()
            .filter(|(_, t)| t.has_prerequisites())
            .map(|(id, _)| id)
    }

    /// Sets every trait to its type baseline and clears custom text and
    /// specialties.
    pub fn reset_to_defaults(&mut self) -> Vec<(TraitId, TraitEvent)> {
        let mut events = Vec::new();
        for (i, t) in self.traits.iter_mut().enumerate() {
            let id = TraitId(i as u32);
            events.extend(t.reset().into_iter().map(|e| (id, e)));
        }
        events
    }

    /// Template names, longest first.
    pub fn names_longest_first(&self) -> impl Iterator<Item = (&str, &[TraitId])> {
        self.names
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    /// Slots carrying a template name, in type order.
    pub fn ids_named(&self, name: &str) -> &[TraitId] {
        self.names
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or_default()
    }
}

fn name_table(traits: &[Trait]) -> Vec<(String, Vec<TraitId>)> {
    let mut by_name: BTreeMap<&str, Vec<TraitId>> = BTreeMap::new();
    for (i, t) in traits.iter().enumerate() {
        by_name.entry(t.name()).or_default().push(TraitId(i as u32));
    }

    let mut names: Vec<(String, Vec<TraitId>)> = by_name
        .into_iter()
        .map(|(name, ids)| (name.to_string(), ids))
        .collect();
    // Longest first, so "Firefight" is tried before "Fight".
    names.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::TraitDefinition;

    fn template() -> Template {
        let mut t = Template::new();
        t.add_trait(TraitType::Attribute, "Mental", TraitDefinition::named("Wits"));
        t.add_trait(TraitType::Skill, "Physical", TraitDefinition::named("Fight"));
        t.add_trait(TraitType::Skill, "Physical", TraitDefinition::named("Firefight"));
        t.add_trait(
            TraitType::Merit,
            "Mental",
            TraitDefinition::named("Language").with_custom(true),
        );
        t.add_trait(
            TraitType::Merit,
            "Supernatural",
            TraitDefinition::named("Herd").with_species("Vampire"),
        );
        t
    }

    #[test]
    fn custom_traits_get_multiple_slots() {
        let config = SheetConfig::new();
        let store = TraitStore::from_template(&template(), &config);

        let slots = store.slots(TraitType::Merit, "Mental", "Language").unwrap();
        assert_eq!(slots.len(), config.trait_multiple_max);
        assert_eq!(store.slots(TraitType::Skill, "Physical", "Fight").unwrap().len(), 1);
        // 1 + 2 + 3 + 1
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn construction_uses_configured_initial_value() {
        let store = TraitStore::from_template(&template(), &SheetConfig::new());
        let id = store.lookup(TraitType::Skill, "Physical", "Fight").unwrap();
        assert_eq!(store.get(id).unwrap().value(), 2);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let store = TraitStore::from_template(&template(), &SheetConfig::new());
        let err = store.lookup(TraitType::Skill, "Physical", "Brawl").unwrap_err();
        assert!(matches!(err, StoreError::UnknownTrait { .. }));
        assert!(store.get(TraitId(99)).is_err());
    }

    #[test]
    fn reset_uses_type_baselines_and_clears_text() {
        let mut store = TraitStore::from_template(&template(), &SheetConfig::new());
        let language = store.lookup(TraitType::Merit, "Mental", "Language").unwrap();
        store
            .get_mut(language)
            .unwrap()
            .set_custom_text("French")
            .unwrap();

        store.reset_to_defaults();

        let wits = store.lookup(TraitType::Attribute, "Mental", "Wits").unwrap();
        let fight = store.lookup(TraitType::Skill, "Physical", "Fight").unwrap();
        assert_eq!(store.get(wits).unwrap().value(), 1);
        assert_eq!(store.get(fight).unwrap().value(), 0);
        assert_eq!(store.get(language).unwrap().custom_text(), "");
    }

    #[test]
    fn saveable_filters_zero_and_foreign_species() {
        let mut store = TraitStore::from_template(&template(), &SheetConfig::new());
        store.reset_to_defaults();
        let herd = store.lookup(TraitType::Merit, "Supernatural", "Herd").unwrap();
        store.get_mut(herd).unwrap().set_value(2).unwrap();

        let human: Vec<_> = store.saveable("Human").map(|(_, t)| t.name()).collect();
        assert_eq!(human, vec!["Wits"]);

        let vampire: Vec<_> = store.saveable("Vampire").map(|(_, t)| t.name()).collect();
        assert_eq!(vampire, vec!["Wits", "Herd"]);
    }

    #[test]
    fn find_by_name_fills_free_custom_slots_in_order() {
        let mut store = TraitStore::from_template(&template(), &SheetConfig::new());
        let first = store
            .find_by_name(TraitType::Merit, "Mental", "Language", Some("French"), &BTreeSet::new())
            .unwrap();
        store.get_mut(first).unwrap().set_custom_text("French").unwrap();

        let again = store.find_by_name(TraitType::Merit, "Mental", "Language", Some("French"), &BTreeSet::new());
        assert_eq!(again, Some(first));

        let second = store
            .find_by_name(TraitType::Merit, "Mental", "Language", Some("German"), &BTreeSet::new())
            .unwrap();
        assert_ne!(second, first);
    }

    #[test]
    fn find_by_name_skips_claimed_slots() {
        let store = TraitStore::from_template(&template(), &SheetConfig::new());
        let slots = store.slots(TraitType::Merit, "Mental", "Language").unwrap().to_vec();

        let mut claimed = BTreeSet::new();
        for expected in &slots {
            let found = store
                .find_by_name(TraitType::Merit, "Mental", "Language", None, &claimed)
                .unwrap();
            assert_eq!(found, *expected);
            claimed.insert(found);
        }
        assert_eq!(
            store.find_by_name(TraitType::Merit, "Mental", "Language", None, &claimed),
            None
        );
    }

    #[test]
    fn find_by_name_returns_none_when_slots_are_taken() {
        let config = SheetConfig {
            trait_multiple_max: 1,
            ..SheetConfig::new()
        };
        let mut store = TraitStore::from_template(&template(), &config);
        let only = store
            .find_by_name(TraitType::Merit, "Mental", "Language", Some("French"), &BTreeSet::new())
            .unwrap();
        store.get_mut(only).unwrap().set_custom_text("French").unwrap();

        assert_eq!(
            store.find_by_name(TraitType::Merit, "Mental", "Language", Some("German"), &BTreeSet::new()),
            None
        );
        assert_eq!(
            store.find_by_name(TraitType::Merit, "Mental", "Unknown", None, &BTreeSet::new()),
            None
        );
    }

    #[test]
    fn names_are_ordered_longest_first() {
        let store = TraitStore::from_template(&template(), &SheetConfig::new());
        let names: Vec<_> = store.names_longest_first().map(|(n, _)| n).collect();
        let firefight = names.iter().position(|n| *n == "Firefight");
        let fight = names.iter().position(|n| *n == "Fight");
        assert!(firefight < fight);
        assert_eq!(store.ids_named("Language").len(), 3);
    }
}
