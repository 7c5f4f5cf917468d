//! Per-species rule tables.

use std::collections::BTreeMap;

/// Kind of social group a character can belong to.
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
#[strum(ascii_case_insensitive)]
pub enum GroupKind {
    Breed,
    Faction,
    Organisation,
    Party,
}

impl GroupKind {
    pub const ALL: [GroupKind; 4] = [Self::Breed, Self::Faction, Self::Organisation, Self::Party];
}

/// Sub-lineage of a breed, with the abilities it grants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kith {
    pub name: String,
    pub abilities: String,
}

/// One selectable group (a concrete breed, faction, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupItem {
    pub name: String,
    pub weakness: Option<String>,
    pub blessing: Option<String>,
    pub kiths: Vec<Kith>,
}

impl GroupItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Species-specific title of a group kind and its selectable items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupTitle {
    /// Species wording, e.g. "Clan" for a vampire's breed.
    pub title: String,
    pub items: Vec<GroupItem>,
}

/// Capabilities granted by one power stat level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerstatEntry {
    pub fuel_max: i32,
    pub fuel_per_turn: i32,
    pub trait_max: i32,
}

/// A severe form of a mild derangement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SevereDerangement {
    pub name: String,
    pub description: String,
}

/// A mild derangement and the severe forms it can escalate into.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerangementData {
    pub name: String,
    pub description: String,
    pub severe: Vec<SevereDerangement>,
}

/// Everything the template knows about one species.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesData {
    pub name: String,
    /// Name of the species' morality trait (e.g. "Humanity").
    pub morale: String,
    /// Name of the species' power stat (e.g. "Blood Potency").
    pub powerstat: String,
    /// Name of the species' power fuel (e.g. "Vitae").
    pub fuel: String,
    /// Display name of the `Power` trait group.
    pub power_name: Option<String>,
    /// Display name of the `Subpower` trait group.
    pub subpower_name: Option<String>,
    /// Creation point budgets per trait type, one entry per priority tier.
    pub creation_points: BTreeMap<String, Vec<i32>>,
    pub groups: BTreeMap<GroupKind, GroupTitle>,
    /// Power stat table keyed by power stat level.
    pub powerstat_table: BTreeMap<i32, PowerstatEntry>,
    pub derangements: Vec<DerangementData>,
}

impl SpeciesData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Power stat capabilities for `level`, if the template defines them.
    pub fn powerstat_entry(&self, level: i32) -> Option<&PowerstatEntry> {
        self.powerstat_table.get(&level)
    }

    /// Items selectable for a group kind.
    pub fn group_items(&self, kind: GroupKind) -> &[GroupItem] {
        self.groups
            .get(&kind)
            .map(|g| g.items.as_slice())
            .unwrap_or_default()
    }

    /// Finds a derangement by name, mild or severe.
    pub fn derangement(&self, name: &str) -> Option<&DerangementData> {
        self.derangements
            .iter()
            .find(|d| d.name == name || d.severe.iter().any(|s| s.name == name))
    }
}
