//! Statistics computed from traits rather than assigned.

pub mod derived;

pub use derived::{DerivedAttributeEngine, DerivedEvent, DerivedKind, DerivedValues};
