//! A single live trait owned by one character.
//!
//! Mutators never notify anyone themselves. They return the events their
//! change produced, in emission order, and an empty list when the new state
//! equals the old one. The owner publishes those events.

use crate::env::TraitDefinition;
use crate::state::{AgeCategory, Era, TraitError, TraitType};

/// Change notification produced by a trait mutator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraitEvent {
    ValueChanged(i32),
    BonusValueChanged(i32),
    /// Always follows a value or bonus change.
    TotalValueChanged(i32),
    SpecialtiesChanged(Vec<String>),
    BonusSpecialtiesChanged(Vec<String>),
    CustomTextChanged(String),
    AvailabilityChanged(bool),
    /// Last event of every user-visible change.
    TraitChanged,
}

impl TraitEvent {
    /// Whether this event can change the outcome of prerequisite checks or
    /// derived attributes.
    pub fn affects_dependents(&self) -> bool {
        matches!(
            self,
            Self::ValueChanged(_)
                | Self::BonusValueChanged(_)
                | Self::SpecialtiesChanged(_)
                | Self::BonusSpecialtiesChanged(_)
        )
    }
}

/// Externally granted part of a trait.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitBonus {
    pub value: i32,
    pub specialties: Vec<String>,
}

/// Character state a trait's eligibility filters are matched against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Applicability<'a> {
    pub species: &'a str,
    pub age: AgeCategory,
    pub era: Era,
    /// Breed and faction of the character, matched against `only` lists.
    pub groups: Vec<&'a str>,
}

/// A named, rated character trait.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trait {
    trait_type: TraitType,
    category: String,
    identifier: String,
    name: String,
    value: i32,
    bonus: Option<TraitBonus>,
    specialties: Vec<String>,
    custom: bool,
    custom_text: String,
    available: bool,

    // Eligibility metadata, fixed once seeded from the template.
    species: Option<String>,
    age: AgeCategory,
    era: Era,
    only: Vec<String>,
    prerequisites: Option<String>,
    allowed_values: Vec<i32>,
    max_specialties: Option<usize>,
}

impl Trait {
    /// Instantiates a definition with the given starting value.
    ///
    /// `initial` falls back to the smallest allowed value when the
    /// definition does not allow it.
    pub fn from_definition(
        trait_type: TraitType,
        category: &str,
        definition: &TraitDefinition,
        trait_value_max: i32,
        initial: i32,
    ) -> Self {
        let allowed_values = definition.allowed_values(trait_value_max);
        let value = if allowed_values.contains(&initial) {
            initial
        } else {
            allowed_values.first().copied().unwrap_or(0)
        };

        Self {
            trait_type,
            category: category.to_string(),
            identifier: definition.identifier.clone(),
            name: definition.name.clone(),
            value,
            bonus: trait_type.supports_bonus().then(TraitBonus::default),
            specialties: Vec::new(),
            custom: definition.custom,
            custom_text: String::new(),
            available: true,
            species: definition.species.clone(),
            age: definition.age,
            era: definition.era,
            only: definition.only.clone(),
            prerequisites: definition.prerequisites.clone(),
            allowed_values,
            max_specialties: definition.max_specialties,
        }
    }

    // ===== accessors =====

    pub fn trait_type(&self) -> TraitType {
        self.trait_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// External modifier; 0 for traits without a bonus part.
    pub fn bonus_value(&self) -> i32 {
        self.bonus.as_ref().map_or(0, |b| b.value)
    }

    pub fn total_value(&self) -> i32 {
        self.value + self.bonus_value()
    }

    pub fn has_bonus(&self) -> bool {
        self.bonus.is_some()
    }

    pub fn specialties(&self) -> &[String] {
        &self.specialties
    }

    pub fn bonus_specialties(&self) -> &[String] {
        self.bonus
            .as_ref()
            .map(|b| b.specialties.as_slice())
            .unwrap_or_default()
    }

    /// Whether the specialty is held, either bought or granted.
    pub fn has_specialty(&self, specialty: &str) -> bool {
        self.specialties.iter().any(|s| s == specialty)
            || self.bonus_specialties().iter().any(|s| s == specialty)
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn custom_text(&self) -> &str {
        &self.custom_text
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn species(&self) -> Option<&str> {
        self.species.as_deref()
    }

    pub fn age(&self) -> AgeCategory {
        self.age
    }

    pub fn era(&self) -> Era {
        self.era
    }

    pub fn only(&self) -> &[String] {
        &self.only
    }

    pub fn has_prerequisites(&self) -> bool {
        self.prerequisites.is_some()
    }

    pub fn prerequisites(&self) -> Option<&str> {
        self.prerequisites.as_deref()
    }

    pub fn allowed_values(&self) -> &[i32] {
        &self.allowed_values
    }

    pub fn max_specialties(&self) -> Option<usize> {
        self.max_specialties
    }

    /// Whether the trait is relevant to a character in the given state.
    pub fn is_applicable(&self, context: &Applicability<'_>) -> bool {
        let species_ok = self
            .species
            .as_deref()
            .is_none_or(|species| species == context.species);
        let only_ok =
            self.only.is_empty() || self.only.iter().any(|o| context.groups.contains(&o.as_str()));

        species_ok && self.age.admits(context.age) && self.era.admits(context.era) && only_ok
    }

    // ===== mutators =====

    /// Sets the base rating.
    ///
    /// Emits `ValueChanged`, `TotalValueChanged`, `TraitChanged`.
    pub fn set_value(&mut self, value: i32) -> Result<Vec<TraitEvent>, TraitError> {
        if !self.allowed_values.contains(&value) {
            return Err(TraitError::ValueNotAllowed {
                name: self.name.clone(),
                value,
                allowed: self.allowed_values.clone(),
            });
        }
        if value == self.value {
            return Ok(Vec::new());
        }

        self.value = value;
        Ok(vec![
            TraitEvent::ValueChanged(value),
            TraitEvent::TotalValueChanged(self.total_value()),
            TraitEvent::TraitChanged,
        ])
    }

    /// Sets the external modifier.
    ///
    /// Emits `BonusValueChanged`, `TotalValueChanged`, `TraitChanged`.
    pub fn set_bonus_value(&mut self, value: i32) -> Result<Vec<TraitEvent>, TraitError> {
        let bonus = self.bonus_mut()?;
        if bonus.value == value {
            return Ok(Vec::new());
        }

        bonus.value = value;
        Ok(vec![
            TraitEvent::BonusValueChanged(value),
            TraitEvent::TotalValueChanged(self.total_value()),
            TraitEvent::TraitChanged,
        ])
    }

    pub fn set_custom_text(&mut self, text: &str) -> Result<Vec<TraitEvent>, TraitError> {
        if !self.custom {
            return Err(TraitError::NotCustom {
                name: self.name.clone(),
            });
        }
        if self.custom_text == text {
            return Ok(Vec::new());
        }

        self.custom_text = text.to_string();
        Ok(vec![
            TraitEvent::CustomTextChanged(self.custom_text.clone()),
            TraitEvent::TraitChanged,
        ])
    }

    /// Replaces the specialty set. Duplicates collapse to their first occurrence.
    pub fn set_specialties<I, S>(&mut self, specialties: I) -> Result<Vec<TraitEvent>, TraitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let specialties = dedup(specialties);
        self.check_specialty_count(specialties.len())?;
        if self.specialties == specialties {
            return Ok(Vec::new());
        }

        self.specialties = specialties;
        Ok(self.specialty_events())
    }

    pub fn append_specialty(&mut self, specialty: &str) -> Result<Vec<TraitEvent>, TraitError> {
        if self.specialties.iter().any(|s| s == specialty) {
            return Ok(Vec::new());
        }
        self.check_specialty_count(self.specialties.len() + 1)?;

        self.specialties.push(specialty.to_string());
        Ok(self.specialty_events())
    }

    pub fn remove_specialty(&mut self, specialty: &str) -> Vec<TraitEvent> {
        let before = self.specialties.len();
        self.specialties.retain(|s| s != specialty);
        if self.specialties.len() == before {
            return Vec::new();
        }
        self.specialty_events()
    }

    pub fn set_bonus_specialties<I, S>(
        &mut self,
        specialties: I,
    ) -> Result<Vec<TraitEvent>, TraitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let specialties = dedup(specialties);
        let bonus = self.bonus_mut()?;
        if bonus.specialties == specialties {
            return Ok(Vec::new());
        }

        bonus.specialties = specialties;
        Ok(vec![
            TraitEvent::BonusSpecialtiesChanged(bonus.specialties.clone()),
            TraitEvent::TraitChanged,
        ])
    }

    pub fn append_bonus_specialty(
        &mut self,
        specialty: &str,
    ) -> Result<Vec<TraitEvent>, TraitError> {
        let mut specialties = self.bonus_specialties().to_vec();
        specialties.push(specialty.to_string());
        self.set_bonus_specialties(specialties)
    }

    pub fn remove_bonus_specialty(
        &mut self,
        specialty: &str,
    ) -> Result<Vec<TraitEvent>, TraitError> {
        let specialties: Vec<String> = self
            .bonus_specialties()
            .iter()
            .filter(|s| *s != specialty)
            .cloned()
            .collect();
        self.set_bonus_specialties(specialties)
    }

    /// Drops every externally granted value and specialty.
    ///
    /// A single `TraitChanged` closes the combined chain.
    pub fn clear_bonus(&mut self) -> Result<Vec<TraitEvent>, TraitError> {
        let mut events = self.set_bonus_value(0)?;
        let specialty_events = self.set_bonus_specialties(Vec::<String>::new())?;
        if !specialty_events.is_empty() {
            events.retain(|e| *e != TraitEvent::TraitChanged);
            events.extend(specialty_events);
        }
        Ok(events)
    }

    /// Restores the per-type baseline and clears user text.
    pub(crate) fn reset(&mut self) -> Vec<TraitEvent> {
        let baseline = self.trait_type.baseline();
        let baseline = if self.allowed_values.contains(&baseline) {
            baseline
        } else {
            self.allowed_values.first().copied().unwrap_or(0)
        };

        let mut events = Vec::new();
        if self.value != baseline {
            self.value = baseline;
            events.push(TraitEvent::ValueChanged(baseline));
            events.push(TraitEvent::TotalValueChanged(self.total_value()));
        }
        if !self.custom_text.is_empty() {
            self.custom_text.clear();
            events.push(TraitEvent::CustomTextChanged(String::new()));
        }
        if !self.specialties.is_empty() {
            self.specialties.clear();
            events.push(TraitEvent::SpecialtiesChanged(Vec::new()));
        }
        if !events.is_empty() {
            events.push(TraitEvent::TraitChanged);
        }
        events
    }

    /// Only the prerequisite checker writes availability.
    pub(crate) fn set_available(&mut self, available: bool) -> Option<TraitEvent> {
        if self.available == available {
            return None;
        }
        self.available = available;
        Some(TraitEvent::AvailabilityChanged(available))
    }

    // ===== helpers =====

    fn bonus_mut(&mut self) -> Result<&mut TraitBonus, TraitError> {
        let name = &self.name;
        self.bonus
            .as_mut()
            .ok_or_else(|| TraitError::BonusNotSupported { name: name.clone() })
    }

    fn check_specialty_count(&self, count: usize) -> Result<(), TraitError> {
        match self.max_specialties {
            Some(max) if count > max => Err(TraitError::TooManySpecialties {
                name: self.name.clone(),
                max,
            }),
            _ => Ok(()),
        }
    }

    fn specialty_events(&self) -> Vec<TraitEvent> {
        vec![
            TraitEvent::SpecialtiesChanged(self.specialties.clone()),
            TraitEvent::TraitChanged,
        ]
    }
}

fn dedup<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.into();
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(def: TraitDefinition) -> Trait {
        Trait::from_definition(TraitType::Skill, "Mental", &def, 5, 0)
    }

    #[test]
    fn set_value_emits_chain_in_order() {
        let mut t = skill(TraitDefinition::named("Occult"));
        let events = t.set_value(3).unwrap();
        assert_eq!(
            events,
            vec![
                TraitEvent::ValueChanged(3),
                TraitEvent::TotalValueChanged(3),
                TraitEvent::TraitChanged,
            ]
        );
    }

    #[test]
    fn setting_current_value_is_silent() {
        let mut t = skill(TraitDefinition::named("Occult"));
        t.set_value(2).unwrap();
        assert!(t.set_value(2).unwrap().is_empty());
        assert!(t.set_bonus_value(0).unwrap().is_empty());
        assert!(t.set_specialties(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn total_value_tracks_both_components() {
        let mut t = skill(TraitDefinition::named("Occult"));
        t.set_value(2).unwrap();
        let events = t.set_bonus_value(1).unwrap();

        // 2 + 1
        assert_eq!(t.total_value(), 3);
        let totals = events
            .iter()
            .filter(|e| matches!(e, TraitEvent::TotalValueChanged(_)))
            .count();
        assert_eq!(totals, 1);
        assert_eq!(events[0], TraitEvent::BonusValueChanged(1));
    }

    #[test]
    fn value_outside_allowed_set_is_rejected() {
        let mut t = Trait::from_definition(
            TraitType::Merit,
            "Physical",
            &TraitDefinition::named("Giant").with_values([4]),
            5,
            0,
        );
        let err = t.set_value(3).unwrap_err();
        assert!(matches!(err, TraitError::ValueNotAllowed { value: 3, .. }));
        assert_eq!(t.value(), 0);
        assert!(t.set_value(4).is_ok());
    }

    #[test]
    fn merits_have_no_bonus_part() {
        let mut t = Trait::from_definition(
            TraitType::Merit,
            "Mental",
            &TraitDefinition::named("Eidetic Memory"),
            5,
            0,
        );
        assert!(matches!(
            t.set_bonus_value(1),
            Err(TraitError::BonusNotSupported { .. })
        ));
        assert_eq!(t.bonus_value(), 0);
    }

    #[test]
    fn initial_value_falls_back_to_smallest_allowed() {
        let t = Trait::from_definition(
            TraitType::Merit,
            "Physical",
            &TraitDefinition::named("Giant").with_values([4]),
            5,
            2,
        );
        assert_eq!(t.value(), 0);
    }

    #[test]
    fn specialty_limit_is_enforced() {
        let mut t = skill(TraitDefinition::named("Firearms").with_max_specialties(1));
        t.append_specialty("Rifles").unwrap();
        let err = t.append_specialty("Pistols").unwrap_err();
        assert!(matches!(err, TraitError::TooManySpecialties { max: 1, .. }));
        assert_eq!(t.specialties(), ["Rifles".to_string()]);
    }

    #[test]
    fn append_and_remove_specialty_are_idempotent() {
        let mut t = skill(TraitDefinition::named("Firearms"));
        assert_eq!(t.append_specialty("Rifles").unwrap().len(), 2);
        assert!(t.append_specialty("Rifles").unwrap().is_empty());
        assert_eq!(t.remove_specialty("Rifles").len(), 2);
        assert!(t.remove_specialty("Rifles").is_empty());
    }

    #[test]
    fn bonus_specialties_count_as_held() {
        let mut t = skill(TraitDefinition::named("Firearms"));
        t.append_bonus_specialty("Rifles").unwrap();
        assert!(t.has_specialty("Rifles"));
        assert!(t.specialties().is_empty());

        let events = t.clear_bonus().unwrap();
        assert_eq!(
            events,
            vec![
                TraitEvent::BonusSpecialtiesChanged(Vec::new()),
                TraitEvent::TraitChanged,
            ]
        );
        assert!(!t.has_specialty("Rifles"));
    }

    #[test]
    fn custom_text_requires_custom_trait() {
        let mut plain = skill(TraitDefinition::named("Occult"));
        assert!(matches!(
            plain.set_custom_text("x"),
            Err(TraitError::NotCustom { .. })
        ));

        let mut custom = Trait::from_definition(
            TraitType::Merit,
            "Mental",
            &TraitDefinition::named("Language").with_custom(true),
            5,
            0,
        );
        assert_eq!(custom.set_custom_text("French").unwrap().len(), 2);
        assert!(custom.set_custom_text("French").unwrap().is_empty());
    }

    #[test]
    fn applicability_filters_species_and_only_list() {
        let t = Trait::from_definition(
            TraitType::Merit,
            "Supernatural",
            &TraitDefinition::named("Herd")
                .with_species("Vampire")
                .with_only(["Daeva".to_string()]),
            5,
            0,
        );
        let mut context = Applicability {
            species: "Vampire",
            groups: vec!["Daeva"],
            ..Applicability::default()
        };
        assert!(t.is_applicable(&context));

        context.groups = vec!["Gangrel"];
        assert!(!t.is_applicable(&context));

        context.species = "Human";
        context.groups = vec!["Daeva"];
        assert!(!t.is_applicable(&context));
    }

    #[test]
    fn reset_returns_to_type_baseline() {
        let mut attr = Trait::from_definition(
            TraitType::Attribute,
            "Mental",
            &TraitDefinition::named("Wits"),
            5,
            2,
        );
        let events = attr.reset();
        assert_eq!(attr.value(), 1);
        assert_eq!(events.first(), Some(&TraitEvent::ValueChanged(1)));
        assert!(attr.reset().is_empty());
    }
}
