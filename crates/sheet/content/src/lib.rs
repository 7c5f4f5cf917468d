//! Data-driven sheet content and character documents.
//!
//! This crate reads and writes everything `sheet-core` keeps out of its rules:
//! - Rule templates (XML, one document per species)
//! - Sheet configuration (TOML)
//! - Character documents (XML, with base64 portrait)
//!
//! Documents carry the program version; [`version::check_version`] decides
//! whether a document from another version can be read.

pub mod document;
pub mod version;
pub mod xml;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use document::{CharacterReader, CharacterWriter, PersistError, ReadReport};
pub use version::{VersionWarning, check_version};
pub use xml::{XmlElement, XmlError};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, LoadResult, LoadedTemplate, TemplateLoader, TemplateWarning,
};
