//! Static rule template shared by every character of a session.
//!
//! A [`Template`] is assembled once by a loader and then wrapped in an
//! `Arc`. Characters only ever read from it: the trait store is seeded from
//! its definitions and the character consults its species tables.
pub mod definition;
pub mod items;
pub mod species;

use std::collections::BTreeMap;

pub use definition::{Characteristic, TraitDefinition};
pub use items::{ArmorData, EquipmentData, WeaponData};
pub use species::{
    DerangementData, GroupItem, GroupKind, GroupTitle, Kith, PowerstatEntry, SevereDerangement,
    SpeciesData,
};

use crate::state::TraitType;

/// Named group of trait definitions, in template order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category {
    pub name: String,
    pub traits: Vec<TraitDefinition>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traits: Vec::new(),
        }
    }

    pub fn definition(&self, identifier: &str) -> Option<&TraitDefinition> {
        self.traits.iter().find(|d| d.identifier == identifier)
    }
}

/// The complete rule set: trait definitions, species tables and item catalogs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Template {
    traits: BTreeMap<TraitType, Vec<Category>>,
    species: BTreeMap<String, SpeciesData>,
    virtues: Vec<Characteristic>,
    vices: Vec<Characteristic>,
    weapons: BTreeMap<String, BTreeMap<String, WeaponData>>,
    armor: BTreeMap<String, ArmorData>,
    equipment: BTreeMap<String, EquipmentData>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== trait definitions =====

    /// Adds a definition to `category`, creating the category on first use.
    ///
    /// A definition with the same identifier in the same category is
    /// replaced, so later documents override earlier ones.
    pub fn add_trait(
        &mut self,
        trait_type: TraitType,
        category: &str,
        definition: TraitDefinition,
    ) {
        let categories = self.traits.entry(trait_type).or_default();
        let index = match categories.iter().position(|c| c.name == category) {
            Some(index) => index,
            None => {
                categories.push(Category::new(category));
                categories.len() - 1
            }
        };
        let traits = &mut categories[index].traits;
        match traits
            .iter_mut()
            .find(|d| d.identifier == definition.identifier)
        {
            Some(existing) => *existing = definition,
            None => traits.push(definition),
        }
    }

    /// Categories of `trait_type` in template order.
    pub fn categories(&self, trait_type: TraitType) -> &[Category] {
        self.traits
            .get(&trait_type)
            .map(|c| c.as_slice())
            .unwrap_or_default()
    }

    pub fn definition(
        &self,
        trait_type: TraitType,
        category: &str,
        identifier: &str,
    ) -> Option<&TraitDefinition> {
        self.categories(trait_type)
            .iter()
            .find(|c| c.name == category)
            .and_then(|c| c.definition(identifier))
    }

    /// Iterates `(type, category, definition)` in type order, then template order.
    pub fn definitions(&self) -> impl Iterator<Item = (TraitType, &str, &TraitDefinition)> {
        self.traits.iter().flat_map(|(trait_type, categories)| {
            categories.iter().flat_map(move |category| {
                category
                    .traits
                    .iter()
                    .map(move |def| (*trait_type, category.name.as_str(), def))
            })
        })
    }

    pub fn trait_count(&self) -> usize {
        self.definitions().count()
    }

    // ===== species =====

    /// Returns the species entry, creating an empty one on first use.
    pub fn species_entry(&mut self, name: &str) -> &mut SpeciesData {
        self.species
            .entry(name.to_string())
            .or_insert_with(|| SpeciesData::new(name))
    }

    pub fn species(&self, name: &str) -> Option<&SpeciesData> {
        self.species.get(name)
    }

    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    // ===== characteristics =====

    pub fn add_virtue(&mut self, virtue: Characteristic) {
        self.virtues.push(virtue);
    }

    pub fn add_vice(&mut self, vice: Characteristic) {
        self.vices.push(vice);
    }

    pub fn virtues(&self) -> &[Characteristic] {
        &self.virtues
    }

    pub fn vices(&self) -> &[Characteristic] {
        &self.vices
    }

    // ===== items =====

    pub fn add_weapon(&mut self, weapon_type: &str, name: &str, data: WeaponData) {
        self.weapons
            .entry(weapon_type.to_string())
            .or_default()
            .insert(name.to_string(), data);
    }

    pub fn add_armor(&mut self, name: &str, data: ArmorData) {
        self.armor.insert(name.to_string(), data);
    }

    pub fn add_equipment(&mut self, name: &str, data: EquipmentData) {
        self.equipment.insert(name.to_string(), data);
    }

    /// Weapons grouped by type (melee, thrown, ranged, ...).
    pub fn weapons(&self) -> &BTreeMap<String, BTreeMap<String, WeaponData>> {
        &self.weapons
    }

    pub fn weapon(&self, name: &str) -> Option<&WeaponData> {
        self.weapons.values().find_map(|w| w.get(name))
    }

    pub fn armor(&self, name: &str) -> Option<&ArmorData> {
        self.armor.get(name)
    }

    pub fn equipment(&self, name: &str) -> Option<&EquipmentData> {
        self.equipment.get(name)
    }

    /// Merges another template into this one. Entries of `other` win.
    pub fn merge(&mut self, other: Template) {
        for (trait_type, categories) in other.traits {
            for category in categories {
                for definition in category.traits {
                    self.add_trait(trait_type, &category.name, definition);
                }
            }
        }
        for (name, data) in other.species {
            let entry = self.species_entry(&name);
            merge_species(entry, data);
        }
        for virtue in other.virtues {
            if !self.virtues.iter().any(|v| v.name == virtue.name) {
                self.virtues.push(virtue);
            }
        }
        for vice in other.vices {
            if !self.vices.iter().any(|v| v.name == vice.name) {
                self.vices.push(vice);
            }
        }
        for (weapon_type, weapons) in other.weapons {
            self.weapons.entry(weapon_type).or_default().extend(weapons);
        }
        self.armor.extend(other.armor);
        self.equipment.extend(other.equipment);
    }
}

fn merge_species(into: &mut SpeciesData, from: SpeciesData) {
    let keep = |current: &mut String, new: String| {
        if !new.is_empty() {
            *current = new;
        }
    };
    keep(&mut into.morale, from.morale);
    keep(&mut into.powerstat, from.powerstat);
    keep(&mut into.fuel, from.fuel);
    if from.power_name.is_some() {
        into.power_name = from.power_name;
    }
    if from.subpower_name.is_some() {
        into.subpower_name = from.subpower_name;
    }
    into.creation_points.extend(from.creation_points);
    into.groups.extend(from.groups);
    into.powerstat_table.extend(from.powerstat_table);
    into.derangements.extend(from.derangements);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_trait_preserves_order_and_replaces_duplicates() {
        let mut template = Template::new();
        template.add_trait(TraitType::Skill, "Mental", TraitDefinition::named("Occult"));
        template.add_trait(TraitType::Skill, "Mental", TraitDefinition::named("Academics"));
        template.add_trait(
            TraitType::Skill,
            "Mental",
            TraitDefinition::named("Occult").with_max_specialties(2),
        );

        let names: Vec<_> = template.categories(TraitType::Skill)[0]
            .traits
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Occult", "Academics"]);
        assert_eq!(
            template
                .definition(TraitType::Skill, "Mental", "Occult")
                .and_then(|d| d.max_specialties),
            Some(2)
        );
    }

    #[test]
    fn definitions_iterate_in_type_order() {
        let mut template = Template::new();
        template.add_trait(TraitType::Merit, "Physical", TraitDefinition::named("Giant"));
        template.add_trait(TraitType::Attribute, "Mental", TraitDefinition::named("Wits"));

        let types: Vec<_> = template.definitions().map(|(t, _, _)| t).collect();
        assert_eq!(types, vec![TraitType::Attribute, TraitType::Merit]);
    }

    #[test]
    fn merge_combines_species_and_catalogs() {
        let mut base = Template::new();
        base.species_entry("Human").morale = "Humanity".into();

        let mut other = Template::new();
        other.species_entry("Human").powerstat = "Wisdom".into();
        other.add_armor("Kevlar vest", ArmorData::default());
        base.merge(other);

        let human = base.species("Human");
        assert_eq!(human.map(|s| s.morale.as_str()), Some("Humanity"));
        assert_eq!(human.map(|s| s.powerstat.as_str()), Some("Wisdom"));
        assert!(base.armor("Kevlar vest").is_some());
    }
}
