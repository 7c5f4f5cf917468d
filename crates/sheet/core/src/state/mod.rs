//! Live per-character trait state.
//!
//! This module owns the trait model, the arena store traits live in, and the
//! flat records used to move traits in and out of documents. Mutation goes
//! through [`crate::Character`], which publishes the resulting events and
//! keeps prerequisites and derived attributes current.
pub mod entry;
pub mod error;
pub mod kind;
pub mod record;
pub mod store;

pub use entry::{Applicability, Trait, TraitBonus, TraitEvent};
pub use error::{StoreError, TraitError};
pub use kind::{AgeCategory, Era, TraitType};
pub use record::{ImportSummary, TraitRecord};
pub use store::{TraitId, TraitStore};
