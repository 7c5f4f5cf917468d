//! Character sheet rules shared by every front end.
//!
//! `sheet-core` defines the trait model, the per-character trait store, the
//! prerequisite evaluator and the derived-attribute engine. It performs no
//! I/O: templates are built by loaders and handed in behind an `Arc`, and
//! documents move in and out through [`TraitRecord`]s. All mutation flows
//! through [`character::Character`], which publishes every change on its
//! [`events::EventBus`].
pub mod character;
pub mod config;
pub mod env;
pub mod error;
pub mod events;
pub mod prerequisite;
pub mod state;
pub mod stats;

pub use character::{
    Armor, Character, CharacterDates, CharacterError, CharacterEvent, DescriptionField, Gender,
    Identity,
};
pub use config::{ParseVersionError, SheetConfig, Version};
pub use env::{
    ArmorData, Category, Characteristic, DerangementData, EquipmentData, GroupItem, GroupKind,
    GroupTitle, Kith, PowerstatEntry, SevereDerangement, SpeciesData, Template, TraitDefinition,
    WeaponData,
};
pub use error::{ErrorSeverity, SheetError};
pub use events::{Callback, EventBus, SheetEvent, SubscriptionId, Topic};
pub use prerequisite::{PrerequisiteChecker, PrerequisiteError, TraitLookup};
pub use state::{
    AgeCategory, Applicability, Era, ImportSummary, StoreError, Trait, TraitBonus, TraitError,
    TraitEvent, TraitId, TraitRecord, TraitStore, TraitType,
};
pub use stats::{DerivedAttributeEngine, DerivedEvent, DerivedKind, DerivedValues};
