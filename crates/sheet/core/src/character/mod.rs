//! The character aggregate.
//!
//! A [`Character`] owns everything one sheet needs: the trait store, the
//! derived-attribute engine, the prerequisite checker, the event bus and the
//! free-form metadata. All mutation goes through it, so every change runs
//! the same pipeline before the call returns:
//!
//! 1. the mutated trait's own event chain is published;
//! 2. if the change can affect other traits, prerequisites are re-checked and
//!    availability changes are published;
//! 3. derived attributes are recomputed and their changes published.

pub mod error;
pub mod identity;

pub use error::{CharacterError, CharacterEvent, DescriptionField};
pub use identity::{Armor, CharacterDates, Gender, Identity};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::SheetConfig;
use crate::env::{GroupKind, PowerstatEntry, SpeciesData, Template};
use crate::events::{EventBus, SheetEvent, SubscriptionId, Topic};
use crate::prerequisite::PrerequisiteChecker;
use crate::state::{
    AgeCategory, Applicability, Era, ImportSummary, Trait, TraitError, TraitEvent, TraitId,
    TraitRecord, TraitStore, TraitType,
};
use crate::stats::{DerivedAttributeEngine, DerivedValues};

/// One editable character sheet.
pub struct Character {
    template: Arc<Template>,
    config: SheetConfig,
    store: TraitStore,
    derived: DerivedAttributeEngine,
    checker: PrerequisiteChecker,
    bus: EventBus,

    species: String,
    era: Era,
    age: u32,
    identity: Identity,
    dates: CharacterDates,
    virtue: String,
    vice: String,
    groups: BTreeMap<GroupKind, String>,
    kith: String,
    height_cm: u32,
    weight_kg: u32,
    eyes: String,
    hair: String,
    nationality: String,
    description: String,
    powerstat: i32,
    morality: i32,
    /// Morality level -> derangement name.
    derangements: BTreeMap<i32, String>,
    armor: Armor,
    /// Weapon category -> weapon names.
    weapons: BTreeMap<String, Vec<String>>,
    equipment: Vec<String>,
    picture: Option<Vec<u8>>,
    modified: bool,
}

impl Character {
    /// Builds a fresh character from a template, reset to defaults.
    ///
    /// Fails if the template lacks a trait the derived attributes need.
    pub fn new(template: Arc<Template>, config: SheetConfig) -> Result<Self, CharacterError> {
        let store = TraitStore::from_template(&template, &config);
        let derived = DerivedAttributeEngine::new(&store, config.adult_age)?;
        let checker = PrerequisiteChecker::new(config.powerstat_identifier.clone());

        let mut character = Self {
            species: config.initial_species.clone(),
            age: config.initial_age,
            powerstat: config.powerstat_default,
            morality: config.morality_default,
            template,
            config,
            store,
            derived,
            checker,
            bus: EventBus::new(),
            era: Era::Modern,
            identity: Identity::default(),
            dates: CharacterDates::default(),
            virtue: String::new(),
            vice: String::new(),
            groups: BTreeMap::new(),
            kith: String::new(),
            height_cm: 0,
            weight_kg: 0,
            eyes: String::new(),
            hair: String::new(),
            nationality: String::new(),
            description: String::new(),
            derangements: BTreeMap::new(),
            armor: Armor::default(),
            weapons: BTreeMap::new(),
            equipment: Vec::new(),
            picture: None,
            modified: false,
        };
        character.reset();
        Ok(character)
    }

    /// Returns the character to the state of a new sheet.
    ///
    /// Every trait goes back to its type baseline, metadata is cleared and
    /// the modified flag is dropped. Subscriptions are kept and receive the
    /// resulting events.
    pub fn reset(&mut self) {
        let virtue = self
            .template
            .virtues()
            .first()
            .map(|v| v.name.clone())
            .unwrap_or_default();
        let vice = self
            .template
            .vices()
            .first()
            .map(|v| v.name.clone())
            .unwrap_or_default();

        self.set_species(&self.config.initial_species.clone());
        self.set_era(Era::Modern);
        self.set_identity(Identity::default());
        self.set_dates(CharacterDates::default());
        self.set_age(self.config.initial_age);
        self.set_virtue(&virtue);
        self.set_vice(&vice);
        for kind in GroupKind::ALL {
            self.set_group(kind, "");
        }
        self.set_kith("");
        self.set_height_cm(0);
        self.set_weight_kg(0);
        self.set_eyes("");
        self.set_hair("");
        self.set_nationality("");
        self.set_description("");
        if self.powerstat != self.config.powerstat_default {
            self.powerstat = self.config.powerstat_default;
            self.notify(CharacterEvent::PowerstatChanged(self.powerstat));
        }
        if self.morality != self.config.morality_default {
            self.morality = self.config.morality_default;
            self.notify(CharacterEvent::MoralityChanged(self.morality));
        }
        if !self.derangements.is_empty() {
            self.derangements.clear();
            self.notify(CharacterEvent::DerangementsChanged);
        }
        if self.armor != Armor::default() {
            self.armor = Armor::default();
            self.notify(CharacterEvent::ArmorChanged(self.armor));
        }
        if !self.weapons.is_empty() || !self.equipment.is_empty() {
            self.weapons.clear();
            self.equipment.clear();
            self.notify(CharacterEvent::ItemsChanged);
        }
        self.set_picture(None);

        let events = self.store.reset_to_defaults();
        self.bus
            .publish_all(events.into_iter().map(|(id, event)| SheetEvent::Trait { id, event }));
        self.refresh_dependents();

        tracing::debug!(
            target: "sheet_core::character",
            species = %self.species,
            traits = self.store.len(),
            "character reset"
        );
        self.modified = false;
    }

    // ===== observers =====

    pub fn subscribe<F>(&mut self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: FnMut(&SheetEvent) + 'static,
    {
        self.bus.subscribe(topic, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ===== accessors =====

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn store(&self) -> &TraitStore {
        &self.store
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    /// Rule tables of the current species, if the template defines it.
    pub fn species_data(&self) -> Option<&SpeciesData> {
        self.template.species(&self.species)
    }

    pub fn era(&self) -> Era {
        self.era
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn dates(&self) -> &CharacterDates {
        &self.dates
    }

    pub fn virtue(&self) -> &str {
        &self.virtue
    }

    pub fn vice(&self) -> &str {
        &self.vice
    }

    /// Selected group of a kind, empty when none is chosen.
    pub fn group(&self, kind: GroupKind) -> &str {
        self.groups.get(&kind).map(String::as_str).unwrap_or_default()
    }

    pub fn kith(&self) -> &str {
        &self.kith
    }

    pub fn height_cm(&self) -> u32 {
        self.height_cm
    }

    pub fn weight_kg(&self) -> u32 {
        self.weight_kg
    }

    pub fn eyes(&self) -> &str {
        &self.eyes
    }

    pub fn hair(&self) -> &str {
        &self.hair
    }

    pub fn nationality(&self) -> &str {
        &self.nationality
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn powerstat(&self) -> i32 {
        self.powerstat
    }

    /// Capabilities of the current power stat level.
    pub fn powerstat_entry(&self) -> Option<&PowerstatEntry> {
        self.species_data()?.powerstat_entry(self.powerstat)
    }

    pub fn morality(&self) -> i32 {
        self.morality
    }

    pub fn derangements(&self) -> &BTreeMap<i32, String> {
        &self.derangements
    }

    pub fn armor(&self) -> Armor {
        self.armor
    }

    pub fn weapons(&self) -> &BTreeMap<String, Vec<String>> {
        &self.weapons
    }

    pub fn equipment(&self) -> &[String] {
        &self.equipment
    }

    pub fn picture(&self) -> Option<&[u8]> {
        self.picture.as_deref()
    }

    /// Whether anything changed since construction, reset or the last save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn derived_values(&self) -> DerivedValues {
        self.derived.values()
    }

    /// Character state matched against trait eligibility filters.
    pub fn applicability(&self) -> Applicability<'_> {
        Applicability {
            species: &self.species,
            age: AgeCategory::of(self.age, self.config.adult_age),
            era: self.era,
            groups: [GroupKind::Breed, GroupKind::Faction]
                .iter()
                .map(|kind| self.group(*kind))
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Slots relevant to the character's species, age, era and groups.
    pub fn applicable_traits(&self) -> impl Iterator<Item = (TraitId, &Trait)> {
        let context = self.applicability();
        self.store
            .iter()
            .filter(move |(_, t)| t.is_applicable(&context))
    }

    // ===== metadata setters =====

    pub fn set_species(&mut self, species: &str) {
        if self.species == species {
            return;
        }
        self.species = species.to_string();
        self.notify(CharacterEvent::SpeciesChanged(self.species.clone()));
    }

    pub fn set_era(&mut self, era: Era) {
        if self.era == era {
            return;
        }
        self.era = era;
        self.notify(CharacterEvent::EraChanged(era));
    }

    /// Changing the age can move the character between kid and adult size.
    pub fn set_age(&mut self, age: u32) {
        if self.age == age {
            return;
        }
        self.age = age;
        self.notify(CharacterEvent::AgeChanged(age));
        self.recompute_derived();
    }

    pub fn set_identity(&mut self, identity: Identity) {
        if self.identity == identity {
            return;
        }
        self.identity = identity;
        self.notify(CharacterEvent::IdentityChanged);
    }

    /// Also updates the age once both birth and in-game date are known.
    pub fn set_dates(&mut self, dates: CharacterDates) {
        if self.dates == dates {
            return;
        }
        self.dates = dates;
        self.notify(CharacterEvent::DatesChanged);
        if let Some(age) = dates.age_at_game_date() {
            self.set_age(age);
        }
    }

    pub fn set_virtue(&mut self, virtue: &str) {
        if self.virtue == virtue {
            return;
        }
        self.virtue = virtue.to_string();
        self.notify(CharacterEvent::VirtueChanged(self.virtue.clone()));
    }

    pub fn set_vice(&mut self, vice: &str) {
        if self.vice == vice {
            return;
        }
        self.vice = vice.to_string();
        self.notify(CharacterEvent::ViceChanged(self.vice.clone()));
    }

    /// Selects a group; an empty name clears the selection.
    ///
    /// Breed and faction feed the `only` filters of [`Self::applicability`].
    pub fn set_group(&mut self, kind: GroupKind, name: &str) {
        if self.group(kind) == name {
            return;
        }
        if name.is_empty() {
            self.groups.remove(&kind);
        } else {
            self.groups.insert(kind, name.to_string());
        }
        self.notify(CharacterEvent::GroupChanged {
            kind,
            name: name.to_string(),
        });
    }

    pub fn set_kith(&mut self, kith: &str) {
        if self.kith == kith {
            return;
        }
        self.kith = kith.to_string();
        self.notify(CharacterEvent::KithChanged(self.kith.clone()));
    }

    pub fn set_height_cm(&mut self, height: u32) {
        if self.height_cm == height {
            return;
        }
        self.height_cm = height;
        self.notify(CharacterEvent::DescriptionChanged(DescriptionField::Height));
    }

    pub fn set_weight_kg(&mut self, weight: u32) {
        if self.weight_kg == weight {
            return;
        }
        self.weight_kg = weight;
        self.notify(CharacterEvent::DescriptionChanged(DescriptionField::Weight));
    }

    pub fn set_eyes(&mut self, eyes: &str) {
        self.set_text(DescriptionField::Eyes, eyes);
    }

    pub fn set_hair(&mut self, hair: &str) {
        self.set_text(DescriptionField::Hair, hair);
    }

    pub fn set_nationality(&mut self, nationality: &str) {
        self.set_text(DescriptionField::Nationality, nationality);
    }

    pub fn set_description(&mut self, description: &str) {
        self.set_text(DescriptionField::Description, description);
    }

    /// Power stat changes re-check prerequisites that reference it.
    pub fn set_powerstat(&mut self, powerstat: i32) -> Result<(), CharacterError> {
        check_range("powerstat", powerstat, 0, self.config.powerstat_max)?;
        if self.powerstat == powerstat {
            return Ok(());
        }
        self.powerstat = powerstat;
        self.notify(CharacterEvent::PowerstatChanged(powerstat));
        self.refresh_dependents();
        Ok(())
    }

    pub fn set_morality(&mut self, morality: i32) -> Result<(), CharacterError> {
        check_range("morality", morality, 0, self.config.morality_max)?;
        if self.morality == morality {
            return Ok(());
        }
        self.morality = morality;
        self.notify(CharacterEvent::MoralityChanged(morality));
        Ok(())
    }

    /// Attaches a derangement to a morality level, or detaches it with `None`.
    pub fn set_derangement(&mut self, level: i32, name: Option<&str>) -> Result<(), CharacterError> {
        check_range(
            "derangement level",
            level,
            1,
            self.config.derangement_morality_max,
        )?;
        let name = name.filter(|n| !n.is_empty());
        if self.derangements.get(&level).map(String::as_str) == name {
            return Ok(());
        }
        match name {
            Some(name) => self.derangements.insert(level, name.to_string()),
            None => self.derangements.remove(&level),
        };
        self.notify(CharacterEvent::DerangementsChanged);
        Ok(())
    }

    pub fn set_armor(&mut self, armor: Armor) -> Result<(), CharacterError> {
        check_range("general armor", armor.general, 0, i32::MAX)?;
        check_range("firearms armor", armor.firearms, 0, i32::MAX)?;
        if self.armor == armor {
            return Ok(());
        }
        self.armor = armor;
        self.notify(CharacterEvent::ArmorChanged(armor));
        Ok(())
    }

    pub fn add_weapon(&mut self, category: &str, name: &str) {
        let list = self.weapons.entry(category.to_string()).or_default();
        if list.iter().any(|w| w == name) {
            return;
        }
        list.push(name.to_string());
        self.notify(CharacterEvent::ItemsChanged);
    }

    pub fn remove_weapon(&mut self, category: &str, name: &str) {
        let Some(list) = self.weapons.get_mut(category) else {
            return;
        };
        let before = list.len();
        list.retain(|w| w != name);
        if list.len() == before {
            return;
        }
        if list.is_empty() {
            self.weapons.remove(category);
        }
        self.notify(CharacterEvent::ItemsChanged);
    }

    pub fn add_equipment(&mut self, name: &str) {
        if self.equipment.iter().any(|e| e == name) {
            return;
        }
        self.equipment.push(name.to_string());
        self.notify(CharacterEvent::ItemsChanged);
    }

    pub fn remove_equipment(&mut self, name: &str) {
        let before = self.equipment.len();
        self.equipment.retain(|e| e != name);
        if self.equipment.len() != before {
            self.notify(CharacterEvent::ItemsChanged);
        }
    }

    pub fn set_picture(&mut self, picture: Option<Vec<u8>>) {
        if self.picture == picture {
            return;
        }
        self.picture = picture;
        self.notify(CharacterEvent::PictureChanged);
    }

    // ===== trait mutation =====

    pub fn lookup(
        &self,
        trait_type: TraitType,
        category: &str,
        identifier: &str,
    ) -> Result<TraitId, CharacterError> {
        Ok(self.store.lookup(trait_type, category, identifier)?)
    }

    pub fn trait_entry(&self, id: TraitId) -> Result<&Trait, CharacterError> {
        Ok(self.store.get(id)?)
    }

    /// Runs one trait mutator and the notification pipeline behind it.
    ///
    /// Mutators validate before they write, so on error nothing changed and
    /// nothing was published.
    pub fn edit_trait<F>(&mut self, id: TraitId, edit: F) -> Result<(), CharacterError>
    where
        F: FnOnce(&mut Trait) -> Result<Vec<TraitEvent>, TraitError>,
    {
        let events = edit(self.store.get_mut(id)?)?;
        self.publish_trait_events(id, events, true);
        Ok(())
    }

    pub fn set_trait_value(&mut self, id: TraitId, value: i32) -> Result<(), CharacterError> {
        self.edit_trait(id, |t| t.set_value(value))
    }

    pub fn set_trait_bonus_value(&mut self, id: TraitId, value: i32) -> Result<(), CharacterError> {
        self.edit_trait(id, |t| t.set_bonus_value(value))
    }

    pub fn set_trait_custom_text(&mut self, id: TraitId, text: &str) -> Result<(), CharacterError> {
        self.edit_trait(id, |t| t.set_custom_text(text))
    }

    /// Specialties are stored as one separated list, so none may contain
    /// the configured separator.
    pub fn set_trait_specialties(
        &mut self,
        id: TraitId,
        specialties: Vec<String>,
    ) -> Result<(), CharacterError> {
        for specialty in &specialties {
            self.check_specialty(specialty)?;
        }
        self.edit_trait(id, |t| t.set_specialties(specialties))
    }

    pub fn append_trait_specialty(&mut self, id: TraitId, specialty: &str) -> Result<(), CharacterError> {
        self.check_specialty(specialty)?;
        self.edit_trait(id, |t| t.append_specialty(specialty))
    }

    pub fn remove_trait_specialty(&mut self, id: TraitId, specialty: &str) -> Result<(), CharacterError> {
        self.edit_trait(id, |t| Ok(t.remove_specialty(specialty)))
    }

    // ===== export / import =====

    /// Records for every trait worth saving under the current species.
    ///
    /// Custom text is written for custom traits other than subpowers, whose
    /// text is part of the template.
    pub fn export_traits(&self) -> Vec<TraitRecord> {
        self.store
            .saveable(&self.species)
            .map(|(_, t)| {
                let record = TraitRecord::new(t.trait_type(), t.category(), t.name(), t.value())
                    .with_specialties(t.specialties().to_vec());
                if t.is_custom() && t.trait_type() != TraitType::Subpower && !t.custom_text().is_empty()
                {
                    record.with_custom_text(t.custom_text())
                } else {
                    record
                }
            })
            .collect()
    }

    /// Applies one saved record. Returns false when the record was skipped.
    ///
    /// A record without a matching trait, or with a value or specialty list
    /// the trait rejects, is dropped and logged. Import never creates traits.
    pub fn import_trait(&mut self, record: &TraitRecord) -> bool {
        let applied = self.apply_record(record, &BTreeSet::new()).is_some();
        if applied {
            self.refresh_dependents();
        }
        applied
    }

    /// Applies a batch of records with a single dependent refresh at the end.
    ///
    /// Each record claims its slot, so repeated records of one custom trait
    /// fill distinct slots in order.
    pub fn import_traits<'a, I>(&mut self, records: I) -> ImportSummary
    where
        I: IntoIterator<Item = &'a TraitRecord>,
    {
        let mut summary = ImportSummary::default();
        let mut claimed = BTreeSet::new();
        for record in records {
            match self.apply_record(record, &claimed) {
                Some(id) => {
                    claimed.insert(id);
                    summary.applied += 1;
                }
                None => summary.skipped += 1,
            }
        }
        if summary.applied > 0 {
            self.refresh_dependents();
        }
        tracing::debug!(
            target: "sheet_core::character",
            applied = summary.applied,
            skipped = summary.skipped,
            "trait records imported"
        );
        summary
    }

    // ===== helpers =====

    fn apply_record(&mut self, record: &TraitRecord, claimed: &BTreeSet<TraitId>) -> Option<TraitId> {
        let Some(id) = self.store.find_by_name(
            record.trait_type,
            &record.category,
            &record.name,
            record.custom_text.as_deref(),
            claimed,
        ) else {
            tracing::debug!(
                target: "sheet_core::character",
                trait_type = %record.trait_type,
                category = %record.category,
                name = %record.name,
                "no matching trait, record skipped"
            );
            return None;
        };

        let staged = match self.store.get(id) {
            Ok(entry) => stage_record(entry, record),
            Err(_) => return None,
        };
        let (updated, events) = match staged {
            Ok(staged) => staged,
            Err(error) => {
                tracing::debug!(
                    target: "sheet_core::character",
                    name = %record.name,
                    %error,
                    "record rejected by trait, skipped"
                );
                return None;
            }
        };

        if let Ok(entry) = self.store.get_mut(id) {
            *entry = updated;
        }
        self.publish_trait_events(id, events, false);
        Some(id)
    }

    fn publish_trait_events(&mut self, id: TraitId, events: Vec<TraitEvent>, refresh: bool) {
        if events.is_empty() {
            return;
        }
        self.modified = true;
        let dependents = events.iter().any(TraitEvent::affects_dependents);
        self.bus
            .publish_all(events.into_iter().map(|event| SheetEvent::Trait { id, event }));
        if refresh && dependents {
            self.refresh_dependents();
        }
    }

    fn refresh_dependents(&mut self) {
        let availability = self.checker.refresh(&mut self.store, self.powerstat);
        self.bus.publish_all(
            availability
                .into_iter()
                .map(|(id, event)| SheetEvent::Trait { id, event }),
        );
        self.recompute_derived();
    }

    fn recompute_derived(&mut self) {
        let events = self.derived.recompute_all(&self.store, self.age);
        self.bus.publish_all(events.into_iter().map(SheetEvent::Derived));
    }

    fn check_specialty(&self, specialty: &str) -> Result<(), CharacterError> {
        let separator = &self.config.separator;
        if !separator.is_empty() && specialty.contains(separator.as_str()) {
            return Err(CharacterError::ReservedSeparator {
                specialty: specialty.to_string(),
                separator: separator.clone(),
            });
        }
        Ok(())
    }

    fn set_text(&mut self, field: DescriptionField, text: &str) {
        let slot = match field {
            DescriptionField::Eyes => &mut self.eyes,
            DescriptionField::Hair => &mut self.hair,
            DescriptionField::Nationality => &mut self.nationality,
            DescriptionField::Description => &mut self.description,
            DescriptionField::Height | DescriptionField::Weight => return,
        };
        if *slot == text {
            return;
        }
        *slot = text.to_string();
        self.notify(CharacterEvent::DescriptionChanged(field));
    }

    fn notify(&mut self, event: CharacterEvent) {
        self.modified = true;
        self.bus.publish(&SheetEvent::Character(event));
    }
}

impl core::fmt::Debug for Character {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Character")
            .field("species", &self.species)
            .field("age", &self.age)
            .field("traits", &self.store.len())
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

/// Applies a record to a copy of the trait, so a rejected field leaves the
/// live trait untouched. The merged chain ends in a single `TraitChanged`.
fn stage_record(entry: &Trait, record: &TraitRecord) -> Result<(Trait, Vec<TraitEvent>), TraitError> {
    let mut staged = entry.clone();
    let mut events = staged.set_value(record.value)?;
    if let Some(text) = &record.custom_text
        && staged.is_custom()
    {
        events.extend(staged.set_custom_text(text)?);
    }
    events.extend(staged.set_specialties(record.specialties.iter().cloned())?);

    events.retain(|e| *e != TraitEvent::TraitChanged);
    if !events.is_empty() {
        events.push(TraitEvent::TraitChanged);
    }
    Ok((staged, events))
}

fn check_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<(), CharacterError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CharacterError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
