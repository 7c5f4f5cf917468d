//! Errors and notifications of the character aggregate.

use crate::character::Armor;
use crate::env::GroupKind;
use crate::error::{ErrorSeverity, SheetError};
use crate::state::{Era, StoreError, TraitError};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CharacterError {
    #[error(transparent)]
    Trait(#[from] TraitError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("specialty {specialty:?} contains the list separator {separator:?}")]
    ReservedSeparator { specialty: String, separator: String },
}

impl SheetError for CharacterError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Trait(e) => e.severity(),
            Self::Store(e) => e.severity(),
            Self::OutOfRange { .. } | Self::ReservedSeparator { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Trait(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::OutOfRange { .. } => "CHARACTER_OUT_OF_RANGE",
            Self::ReservedSeparator { .. } => "CHARACTER_RESERVED_SEPARATOR",
        }
    }
}

/// Free-text and physical description fields.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DescriptionField {
    Height,
    Weight,
    Eyes,
    Hair,
    Nationality,
    Description,
}

/// Character-level change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacterEvent {
    SpeciesChanged(String),
    EraChanged(Era),
    AgeChanged(u32),
    IdentityChanged,
    DatesChanged,
    VirtueChanged(String),
    ViceChanged(String),
    GroupChanged { kind: GroupKind, name: String },
    KithChanged(String),
    DescriptionChanged(DescriptionField),
    PowerstatChanged(i32),
    MoralityChanged(i32),
    DerangementsChanged,
    ArmorChanged(Armor),
    ItemsChanged,
    PictureChanged,
}
