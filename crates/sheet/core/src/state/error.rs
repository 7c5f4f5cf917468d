//! Errors raised by trait mutation and store lookups.

use crate::error::{ErrorSeverity, SheetError};
use crate::state::TraitType;

/// Rejected trait edit. The trait is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TraitError {
    #[error("value {value} is not allowed for '{name}' (allowed: {allowed:?})")]
    ValueNotAllowed {
        name: String,
        value: i32,
        allowed: Vec<i32>,
    },

    #[error("'{name}' accepts at most {max} specialties")]
    TooManySpecialties { name: String, max: usize },

    #[error("'{name}' has no bonus part")]
    BonusNotSupported { name: String },

    #[error("'{name}' does not take custom text")]
    NotCustom { name: String },
}

impl SheetError for TraitError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ValueNotAllowed { .. }
            | Self::TooManySpecialties { .. }
            | Self::NotCustom { .. } => ErrorSeverity::Validation,
            Self::BonusNotSupported { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ValueNotAllowed { .. } => "TRAIT_VALUE_NOT_ALLOWED",
            Self::TooManySpecialties { .. } => "TRAIT_TOO_MANY_SPECIALTIES",
            Self::BonusNotSupported { .. } => "TRAIT_BONUS_NOT_SUPPORTED",
            Self::NotCustom { .. } => "TRAIT_NOT_CUSTOM",
        }
    }
}

/// Lookup of a key the store was never seeded with.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no trait '{identifier}' in {trait_type}/{category}")]
    UnknownTrait {
        trait_type: TraitType,
        category: String,
        identifier: String,
    },

    #[error("trait handle {0} does not belong to this store")]
    InvalidId(u32),
}

impl SheetError for StoreError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTrait { .. } => "STORE_UNKNOWN_TRAIT",
            Self::InvalidId(_) => "STORE_INVALID_ID",
        }
    }
}
