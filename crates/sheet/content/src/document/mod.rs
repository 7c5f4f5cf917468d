//! Character documents.
//!
//! A character is stored as one XML document rooted at the program name:
//!
//! ```text
//! <SoulCreator version="0.8">
//!   <species>Vampire</species>
//!   <era>Modern</era>
//!   <identities><identity forenames="..." surname="..." gender="Female"/></identities>
//!   <dates birth="1980-04-01" becoming="2005-10-31" game="2012-06-01"/>
//!   <virtue/> <vice/> <breed kith="..."/> <faction/> <organisation/> <party/>
//!   <height/> <weight/> <eyes/> <hair/> <nationality/> <description/>
//!   <powerstat/> <morality/>
//!   <derangements><derangement morality="5">Fixation</derangement></derangements>
//!   <armor>1;0</armor>
//!   <Traits>
//!     <Type name="Skill">
//!       <Category name="Mental">
//!         <trait name="Occult" value="2"><specialties>Ghosts;Rituals</specialties></trait>
//!       </Category>
//!     </Type>
//!   </Traits>
//!   <Items>...</Items>
//!   <picture>base64</picture>
//! </SoulCreator>
//! ```

pub mod reader;
pub mod writer;

pub use reader::CharacterReader;
pub use writer::CharacterWriter;

use std::path::PathBuf;

use sheet_core::{CharacterError, ErrorSeverity, SheetError, Version};

use crate::version::VersionWarning;
use crate::xml::XmlError;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("<{found}> is not a <{expected}> document")]
    WrongDocument { found: String, expected: String },

    #[error("document version {found} cannot be read by version {}", supported.document_string())]
    IncompatibleVersion { found: String, supported: Version },

    #[error("malformed <{element}>: {reason}")]
    Malformed { element: String, reason: String },

    #[error("document value rejected: {0}")]
    Rejected(#[from] CharacterError),
}

impl PersistError {
    pub(crate) fn malformed(element: &str, reason: impl core::fmt::Display) -> Self {
        Self::Malformed {
            element: element.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl SheetError for PersistError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } => ErrorSeverity::Recoverable,
            Self::Xml(_) | Self::WrongDocument { .. } | Self::Malformed { .. } => {
                ErrorSeverity::Validation
            }
            Self::IncompatibleVersion { .. } => ErrorSeverity::Fatal,
            Self::Rejected(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "PERSIST_IO",
            Self::Xml(_) => "PERSIST_XML",
            Self::WrongDocument { .. } => "PERSIST_WRONG_DOCUMENT",
            Self::IncompatibleVersion { .. } => "PERSIST_INCOMPATIBLE_VERSION",
            Self::Malformed { .. } => "PERSIST_MALFORMED",
            Self::Rejected(e) => e.error_code(),
        }
    }
}

/// Outcome of reading a character document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadReport {
    /// Set when the document came from another, still compatible version.
    pub version_warning: Option<VersionWarning>,
    pub traits_applied: usize,
    /// Trait records the current template has no slot for.
    pub traits_skipped: usize,
}
