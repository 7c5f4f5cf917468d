//! Error classification shared by every error enum in the crate.
//!
//! Each subsystem keeps its own enum next to the operations that produce it
//! (`TraitError`, `StoreError`, `PrerequisiteError`, `CharacterError`).
//! Content mismatches and malformed prerequisites never surface here: they
//! are logged and absorbed where they occur.

/// How a caller should treat an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum ErrorSeverity {
    /// The caller can continue, e.g. by skipping an imported record or
    /// picking another file.
    Recoverable,

    /// The input was rejected; repeating it unchanged fails again.
    ///
    /// Examples: value outside the allowed set, too many specialties
    Validation,

    /// Template and rules disagree, e.g. a derived-attribute input is
    /// missing from the template.
    Internal,

    /// The operation cannot continue at all.
    Fatal,
}

impl ErrorSeverity {
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// True for broken content rather than bad input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Implemented by every sheet error enum.
pub trait SheetError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier of the variant, for logs.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_names_and_classes() {
        assert_eq!(ErrorSeverity::Validation.to_string(), "validation");
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
    }
}
