//! Flat trait records exchanged with the persistence layer.

use crate::state::TraitType;

/// One saved trait: what a document stores per rated trait.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitRecord {
    pub trait_type: TraitType,
    pub category: String,
    pub name: String,
    pub value: i32,
    pub custom_text: Option<String>,
    pub specialties: Vec<String>,
}

impl TraitRecord {
    pub fn new(
        trait_type: TraitType,
        category: impl Into<String>,
        name: impl Into<String>,
        value: i32,
    ) -> Self {
        Self {
            trait_type,
            category: category.into(),
            name: name.into(),
            value,
            custom_text: None,
            specialties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_custom_text(mut self, text: impl Into<String>) -> Self {
        self.custom_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_specialties(mut self, specialties: impl IntoIterator<Item = String>) -> Self {
        self.specialties = specialties.into_iter().collect();
        self
    }
}

/// Outcome of a batch import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub applied: usize,
    /// Records without a matching trait, or whose value the trait rejects.
    pub skipped: usize,
}
