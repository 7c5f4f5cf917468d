//! Derived attributes - statistics computed from other traits.
//!
//! Formulas:
//! - Size: 5 - (1 if kid) + (1 if Giant > 0)
//! - Initiative: Dexterity + Composure + Fast Reflexes
//! - Speed: Strength + Dexterity + 5 + Fleet of Foot
//! - Defense: min(Wits, Dexterity)
//! - Health: Stamina + Size
//! - Willpower: Resolve + Composure
//!
//! Every input is the trait's base value. Each attribute remembers the value
//! it last reported and only reports again when the value changes.

use crate::state::{StoreError, TraitId, TraitStore, TraitType};

/// One of the six derived attributes.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DerivedKind {
    Size,
    Initiative,
    Speed,
    Defense,
    Health,
    Willpower,
}

impl DerivedKind {
    pub const ALL: [DerivedKind; 6] = [
        Self::Size,
        Self::Initiative,
        Self::Speed,
        Self::Defense,
        Self::Health,
        Self::Willpower,
    ];
}

/// A derived attribute took a new value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedEvent {
    pub kind: DerivedKind,
    pub value: i32,
}

/// Last reported value of every derived attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedValues {
    pub size: i32,
    pub initiative: i32,
    pub speed: i32,
    pub defense: i32,
    pub health: i32,
    pub willpower: i32,
}

impl DerivedValues {
    pub fn get(&self, kind: DerivedKind) -> i32 {
        match kind {
            DerivedKind::Size => self.size,
            DerivedKind::Initiative => self.initiative,
            DerivedKind::Speed => self.speed,
            DerivedKind::Defense => self.defense,
            DerivedKind::Health => self.health,
            DerivedKind::Willpower => self.willpower,
        }
    }

    fn slot(&mut self, kind: DerivedKind) -> &mut i32 {
        match kind {
            DerivedKind::Size => &mut self.size,
            DerivedKind::Initiative => &mut self.initiative,
            DerivedKind::Speed => &mut self.speed,
            DerivedKind::Defense => &mut self.defense,
            DerivedKind::Health => &mut self.health,
            DerivedKind::Willpower => &mut self.willpower,
        }
    }
}

/// Store handles of every formula input, resolved once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Inputs {
    strength: TraitId,
    dexterity: TraitId,
    stamina: TraitId,
    wits: TraitId,
    resolve: TraitId,
    composure: TraitId,
    giant: TraitId,
    fleet_of_foot: TraitId,
    fast_reflexes: TraitId,
}

impl Inputs {
    fn resolve(store: &TraitStore) -> Result<Self, StoreError> {
        use TraitType::{Attribute, Merit};

        Ok(Self {
            strength: store.lookup(Attribute, "Physical", "Strength")?,
            dexterity: store.lookup(Attribute, "Physical", "Dexterity")?,
            stamina: store.lookup(Attribute, "Physical", "Stamina")?,
            wits: store.lookup(Attribute, "Mental", "Wits")?,
            resolve: store.lookup(Attribute, "Mental", "Resolve")?,
            composure: store.lookup(Attribute, "Social", "Composure")?,
            giant: store.lookup(Merit, "Physical", "Giant")?,
            fleet_of_foot: store.lookup(Merit, "Physical", "Fleet of Foot")?,
            fast_reflexes: store.lookup(Merit, "Physical", "Fast Reflexes")?,
        })
    }
}

/// Per-character derived attribute calculator.
#[derive(Clone, Debug)]
pub struct DerivedAttributeEngine {
    inputs: Inputs,
    adult_age: u32,
    last: DerivedValues,
}

impl DerivedAttributeEngine {
    /// Resolves the formula inputs. Fails if the template lacks one of them.
    pub fn new(store: &TraitStore, adult_age: u32) -> Result<Self, StoreError> {
        Ok(Self {
            inputs: Inputs::resolve(store)?,
            adult_age,
            last: DerivedValues::default(),
        })
    }

    /// Last reported values.
    pub fn values(&self) -> DerivedValues {
        self.last
    }

    pub fn calc_size(&mut self, store: &TraitStore, age: u32, events: &mut Vec<DerivedEvent>) -> i32 {
        let kid = i32::from(age < self.adult_age);
        let giant = i32::from(value(store, self.inputs.giant) > 0);
        let result = 5 - kid + giant;

        if self.report(DerivedKind::Size, result, events) {
            // Health depends on size.
            self.calc_health(store, age, events);
        }
        result
    }

    pub fn calc_initiative(&mut self, store: &TraitStore, events: &mut Vec<DerivedEvent>) -> i32 {
        let result = value(store, self.inputs.dexterity)
            + value(store, self.inputs.composure)
            + value(store, self.inputs.fast_reflexes);
        self.report(DerivedKind::Initiative, result, events);
        result
    }

    pub fn calc_speed(&mut self, store: &TraitStore, events: &mut Vec<DerivedEvent>) -> i32 {
        let result = value(store, self.inputs.strength)
            + value(store, self.inputs.dexterity)
            + 5
            + value(store, self.inputs.fleet_of_foot);
        self.report(DerivedKind::Speed, result, events);
        result
    }

    pub fn calc_defense(&mut self, store: &TraitStore, events: &mut Vec<DerivedEvent>) -> i32 {
        let result = value(store, self.inputs.wits).min(value(store, self.inputs.dexterity));
        self.report(DerivedKind::Defense, result, events);
        result
    }

    /// Recomputes size first, so health always sees the current size.
    pub fn calc_health(&mut self, store: &TraitStore, age: u32, events: &mut Vec<DerivedEvent>) -> i32 {
        let size = self.calc_size(store, age, events);
        let result = value(store, self.inputs.stamina) + size;
        self.report(DerivedKind::Health, result, events);
        result
    }

    pub fn calc_willpower(&mut self, store: &TraitStore, events: &mut Vec<DerivedEvent>) -> i32 {
        let result = value(store, self.inputs.resolve) + value(store, self.inputs.composure);
        self.report(DerivedKind::Willpower, result, events);
        result
    }

    /// Recomputes all six attributes and returns the changes in report order.
    pub fn recompute_all(&mut self, store: &TraitStore, age: u32) -> Vec<DerivedEvent> {
        let mut events = Vec::new();
        self.calc_size(store, age, &mut events);
        self.calc_initiative(store, &mut events);
        self.calc_speed(store, &mut events);
        self.calc_defense(store, &mut events);
        self.calc_health(store, age, &mut events);
        self.calc_willpower(store, &mut events);
        events
    }

    fn report(&mut self, kind: DerivedKind, result: i32, events: &mut Vec<DerivedEvent>) -> bool {
        let slot = self.last.slot(kind);
        if *slot == result {
            return false;
        }
        *slot = result;
        tracing::trace!(target: "sheet_core::derived", %kind, value = result, "derived attribute changed");
        events.push(DerivedEvent {
            kind,
            value: result,
        });
        true
    }
}

fn value(store: &TraitStore, id: TraitId) -> i32 {
    // Handles are resolved against this store at construction.
    store.get(id).map_or(0, |t| t.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use crate::env::{Template, TraitDefinition};

    fn store() -> TraitStore {
        let mut template = Template::new();
        for (category, names) in [
            ("Mental", ["Intelligence", "Wits", "Resolve"]),
            ("Physical", ["Strength", "Dexterity", "Stamina"]),
            ("Social", ["Presence", "Manipulation", "Composure"]),
        ] {
            for name in names {
                template.add_trait(TraitType::Attribute, category, TraitDefinition::named(name));
            }
        }
        template.add_trait(
            TraitType::Merit,
            "Physical",
            TraitDefinition::named("Giant").with_values([4]),
        );
        template.add_trait(
            TraitType::Merit,
            "Physical",
            TraitDefinition::named("Fleet of Foot").with_values([1, 2, 3]),
        );
        template.add_trait(
            TraitType::Merit,
            "Physical",
            TraitDefinition::named("Fast Reflexes").with_values([1, 2]),
        );
        let mut store = TraitStore::from_template(&template, &SheetConfig::new());
        store.reset_to_defaults();
        store
    }

    fn set(store: &mut TraitStore, trait_type: TraitType, category: &str, name: &str, value: i32) {
        let id = store.lookup(trait_type, category, name).unwrap();
        store.get_mut(id).unwrap().set_value(value).unwrap();
    }

    #[test]
    fn speed_reports_exactly_once_per_change() {
        let mut store = store();
        let mut engine = DerivedAttributeEngine::new(&store, 13).unwrap();
        set(&mut store, TraitType::Attribute, "Physical", "Strength", 3);
        set(&mut store, TraitType::Attribute, "Physical", "Dexterity", 2);

        let mut events = Vec::new();
        // 3 + 2 + 5 + 0
        assert_eq!(engine.calc_speed(&store, &mut events), 10);

        set(&mut store, TraitType::Merit, "Physical", "Fleet of Foot", 1);
        let mut events = Vec::new();
        assert_eq!(engine.calc_speed(&store, &mut events), 11);
        assert_eq!(
            events,
            vec![DerivedEvent {
                kind: DerivedKind::Speed,
                value: 11
            }]
        );

        let mut events = Vec::new();
        assert_eq!(engine.calc_speed(&store, &mut events), 11);
        assert!(events.is_empty());
    }

    #[test]
    fn kid_size_and_health() {
        let mut store = store();
        let mut engine = DerivedAttributeEngine::new(&store, 13).unwrap();
        set(&mut store, TraitType::Attribute, "Physical", "Stamina", 3);

        let mut events = Vec::new();
        // 3 + (5 - 1 + 0)
        assert_eq!(engine.calc_health(&store, 10, &mut events), 7);
        assert_eq!(engine.values().size, 4);
        assert_eq!(engine.values().health, 7);

        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![DerivedKind::Size, DerivedKind::Health]);
    }

    #[test]
    fn size_change_pulls_health_along() {
        let mut store = store();
        let mut engine = DerivedAttributeEngine::new(&store, 13).unwrap();
        set(&mut store, TraitType::Attribute, "Physical", "Stamina", 2);
        engine.recompute_all(&store, 30);
        // 2 + 5
        assert_eq!(engine.values().health, 7);

        set(&mut store, TraitType::Merit, "Physical", "Giant", 4);
        let mut events = Vec::new();
        engine.calc_size(&store, 30, &mut events);
        assert_eq!(
            events,
            vec![
                DerivedEvent {
                    kind: DerivedKind::Size,
                    value: 6
                },
                DerivedEvent {
                    kind: DerivedKind::Health,
                    value: 8
                },
            ]
        );
    }

    #[test]
    fn recompute_all_is_quiet_without_input_changes() {
        let mut store = store();
        let mut engine = DerivedAttributeEngine::new(&store, 13).unwrap();
        set(&mut store, TraitType::Attribute, "Mental", "Wits", 3);
        set(&mut store, TraitType::Attribute, "Physical", "Dexterity", 2);

        let first = engine.recompute_all(&store, 25);
        assert_eq!(first.len(), 6);
        assert_eq!(engine.values().defense, 2);
        assert!(engine.recompute_all(&store, 25).is_empty());
    }

    #[test]
    fn missing_input_fails_construction() {
        let store = TraitStore::from_template(&Template::new(), &SheetConfig::new());
        assert!(DerivedAttributeEngine::new(&store, 13).is_err());
    }
}
