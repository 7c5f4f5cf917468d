//! Document version compatibility.

use sheet_core::{SheetConfig, Version};

use crate::document::PersistError;

/// A document from another version that can still be imported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionWarning {
    pub found: Version,
    pub supported: Version,
}

impl core::fmt::Display for VersionWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "document version {} differs from program version {}; some values may be wrong after import",
            self.found.document_string(),
            self.supported.document_string()
        )
    }
}

/// Classifies a document by its root element name and version attribute.
///
/// - another root name: [`PersistError::WrongDocument`]
/// - same `major.minor`: compatible
/// - other major, or minor below `config.min_compatible_minor`:
///   [`PersistError::IncompatibleVersion`]
/// - anything else: importable with a [`VersionWarning`]
pub fn check_version(
    root_name: &str,
    found: &str,
    config: &SheetConfig,
) -> Result<Option<VersionWarning>, PersistError> {
    if root_name != config.program_name {
        return Err(PersistError::WrongDocument {
            found: root_name.to_string(),
            expected: config.program_name.clone(),
        });
    }

    let version: Version = found
        .parse()
        .map_err(|_| PersistError::IncompatibleVersion {
            found: found.to_string(),
            supported: config.version,
        })?;
    let supported = config.version;

    if version.major == supported.major && version.minor == supported.minor {
        return Ok(None);
    }
    if version.major != supported.major || version.minor < config.min_compatible_minor {
        return Err(PersistError::IncompatibleVersion {
            found: found.to_string(),
            supported,
        });
    }
    Ok(Some(VersionWarning {
        found: version,
        supported,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_versions() {
        let config = SheetConfig::new();

        assert_eq!(check_version("SoulCreator", "0.8", &config).unwrap(), None);
        // change numbers never matter
        assert_eq!(check_version("SoulCreator", "0.8.3", &config).unwrap(), None);

        let soft = check_version("SoulCreator", "0.7", &config).unwrap().unwrap();
        assert_eq!(soft.found, Version::new(0, 7, 0));

        assert!(matches!(
            check_version("SoulCreator", "0.6", &config),
            Err(PersistError::IncompatibleVersion { .. })
        ));
        assert!(matches!(
            check_version("SoulCreator", "1.8", &config),
            Err(PersistError::IncompatibleVersion { .. })
        ));
        assert!(matches!(
            check_version("SoulCreator", "garbage", &config),
            Err(PersistError::IncompatibleVersion { .. })
        ));
        assert!(matches!(
            check_version("OtherProgram", "0.8", &config),
            Err(PersistError::WrongDocument { .. })
        ));
    }
}
