//! Trait definitions as declared by rule templates.

use crate::state::{AgeCategory, Era};

/// A trait as declared by the template, before any character owns it.
///
/// The store instantiates each definition once, or `trait_multiple_max`
/// times when `custom` is set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitDefinition {
    /// Stable key, unique within its category. Usually equal to `name`.
    pub identifier: String,
    pub name: String,
    /// Species the trait is restricted to; `None` means every species.
    pub species: Option<String>,
    pub age: AgeCategory,
    pub era: Era,
    /// Whether the trait takes free text (e.g. which language).
    pub custom: bool,
    /// Explicit allowed ratings. `None` means `0..=trait_value_max`.
    /// An explicit list always contains 0 (not purchased).
    pub values: Option<Vec<i32>>,
    /// Suggested specialties.
    pub specialties: Vec<String>,
    /// Raw prerequisite expression.
    pub prerequisites: Option<String>,
    /// Breeds or factions the trait is restricted to; empty means all.
    pub only: Vec<String>,
    /// Level of a subpower within its power tree.
    pub level: Option<u32>,
    /// Maximum number of user-assigned specialties.
    pub max_specialties: Option<usize>,
}

impl TraitDefinition {
    /// Creates an unrestricted definition.
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            species: None,
            age: AgeCategory::All,
            era: Era::All,
            custom: false,
            values: None,
            specialties: Vec::new(),
            prerequisites: None,
            only: Vec::new(),
            level: None,
            max_specialties: None,
        }
    }

    /// Creates a definition whose identifier equals its name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name)
    }

    #[must_use]
    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    #[must_use]
    pub fn with_age(mut self, age: AgeCategory) -> Self {
        self.age = age;
        self
    }

    #[must_use]
    pub fn with_era(mut self, era: Era) -> Self {
        self.era = era;
        self
    }

    #[must_use]
    pub fn with_custom(mut self, custom: bool) -> Self {
        self.custom = custom;
        self
    }

    /// Restricts the allowed ratings. 0 is always added.
    #[must_use]
    pub fn with_values(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        let mut values: Vec<i32> = values.into_iter().collect();
        values.push(0);
        values.sort_unstable();
        values.dedup();
        self.values = Some(values);
        self
    }

    #[must_use]
    pub fn with_prerequisites(mut self, prerequisites: impl Into<String>) -> Self {
        let text = prerequisites.into();
        self.prerequisites = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
        self
    }

    #[must_use]
    pub fn with_specialties(mut self, specialties: impl IntoIterator<Item = String>) -> Self {
        self.specialties = specialties.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_only(mut self, only: impl IntoIterator<Item = String>) -> Self {
        self.only = only.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_max_specialties(mut self, max: usize) -> Self {
        self.max_specialties = Some(max);
        self
    }

    /// Allowed ratings, resolving the default range.
    pub fn allowed_values(&self, trait_value_max: i32) -> Vec<i32> {
        match &self.values {
            Some(values) => values.clone(),
            None => (0..=trait_value_max).collect(),
        }
    }
}

/// A virtue or vice: a named characteristic without a rating.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Characteristic {
    pub name: String,
    pub age: AgeCategory,
}

impl Characteristic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: AgeCategory::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_always_include_zero() {
        let def = TraitDefinition::named("Giant").with_values([4]);
        assert_eq!(def.values, Some(vec![0, 4]));
        assert_eq!(def.allowed_values(5), vec![0, 4]);
    }

    #[test]
    fn missing_values_use_default_range() {
        let def = TraitDefinition::named("Wits");
        assert_eq!(def.allowed_values(5), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn blank_prerequisites_are_dropped() {
        let def = TraitDefinition::named("Ambidextrous").with_prerequisites("   ");
        assert_eq!(def.prerequisites, None);
    }
}
