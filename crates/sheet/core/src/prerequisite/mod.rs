//! Prerequisite expressions gating whether a trait can be bought.
//!
//! Templates attach boolean expressions such as
//! `Wits > 2 and (Larceny > 1 or Subterfuge > 1)` to traits. This module
//! tokenizes them against the known trait names, parses them into an
//! [`Expr`] tree and evaluates the tree against live values. Nothing is
//! substituted textually and nothing is handed to a general evaluator.
//!
//! ## Operands
//!
//! - integer literals
//! - trait names, including multi-word names (`Fleet of Foot`)
//! - `Name.Specialty`: 1 when the trait holds the specialty, else 0
//! - `Type.Name` (`Power.Animalism`): the named trait of that type only
//! - the configured power stat identifier (`Powerstat`)
//!
//! A name known under several types resolves to the first type in
//! [`TraitType`] order. A custom-text trait with several slots resolves to
//! its highest-rated slot.
//!
//! Any failure makes the trait unavailable. Failures are logged, never
//! returned to the editing caller.

pub mod checker;
pub mod evaluate;
pub mod lexer;
pub mod parser;

pub use checker::PrerequisiteChecker;
pub use evaluate::evaluate;
pub use lexer::{CompareOp, Token, tokenize};
pub use parser::{Expr, parse};

use crate::error::{ErrorSeverity, SheetError};
use crate::state::TraitType;

/// Read access to trait values, as needed by the evaluator.
pub trait TraitLookup {
    /// Every referenceable trait name with its type, longest names first.
    fn names(&self) -> Vec<(&str, TraitType)>;

    /// Current rating of the named trait. `None` if unknown.
    fn value_of(&self, trait_type: Option<TraitType>, name: &str) -> Option<i32>;

    /// Whether the named trait holds `specialty`. `None` if the trait is unknown.
    fn has_specialty(
        &self,
        trait_type: Option<TraitType>,
        name: &str,
        specialty: &str,
    ) -> Option<bool>;
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PrerequisiteError {
    #[error("empty prerequisite expression")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { offset: usize, ch: char },

    #[error("unknown reference '{0}'")]
    UnknownReference(String),

    #[error("number '{0}' is out of range")]
    NumberOutOfRange(String),

    #[error("unexpected {found}")]
    UnexpectedToken { found: String },

    #[error("expression ended unexpectedly")]
    UnexpectedEnd,

    #[error("trait '{0}' cannot be resolved")]
    UnresolvedTrait(String),
}

impl SheetError for PrerequisiteError {
    fn severity(&self) -> ErrorSeverity {
        // Broken expressions come from template content.
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "PREREQ_EMPTY",
            Self::UnexpectedCharacter { .. } => "PREREQ_UNEXPECTED_CHARACTER",
            Self::UnknownReference(_) => "PREREQ_UNKNOWN_REFERENCE",
            Self::NumberOutOfRange(_) => "PREREQ_NUMBER_OUT_OF_RANGE",
            Self::UnexpectedToken { .. } => "PREREQ_UNEXPECTED_TOKEN",
            Self::UnexpectedEnd => "PREREQ_UNEXPECTED_END",
            Self::UnresolvedTrait(_) => "PREREQ_UNRESOLVED_TRAIT",
        }
    }
}

/// Tokenizes and parses `text` against the names `lookup` knows.
pub fn compile(
    text: &str,
    lookup: &dyn TraitLookup,
    powerstat_identifier: &str,
) -> Result<Expr, PrerequisiteError> {
    let names = lookup.names();
    let tokens = tokenize(text, &names, powerstat_identifier)?;
    parse(&tokens)
}
