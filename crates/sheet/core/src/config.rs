//! Sheet configuration constants and tunable parameters.

use core::fmt;
use core::str::FromStr;

/// Program version stamped into every document the program writes.
///
/// Documents carry `major.minor`; the change number only distinguishes builds
/// that are guaranteed to read each other's files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub change: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, change: u32) -> Self {
        Self {
            major,
            minor,
            change,
        }
    }

    /// Returns the `major.minor` form written into documents.
    pub fn document_string(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.change)
    }
}

/// Error returned when a version string is not `major.minor[.change]`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid version string '{0}'")]
pub struct ParseVersionError(pub String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseVersionError(s.to_string());
        let mut parts = s.trim().split('.');

        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let change = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::new(major, minor, change))
    }
}

/// Character sheet configuration.
///
/// Every field has a default, so a configuration file only needs to list the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetConfig {
    /// Number of independent slots created for each custom-text trait.
    pub trait_multiple_max: usize,

    /// Characters younger than this count as kids (size penalty, kid-only traits).
    pub adult_age: u32,

    /// Age assigned to a freshly reset character.
    pub initial_age: u32,

    /// Species assigned to a freshly reset character.
    pub initial_species: String,

    /// Value every trait receives when the store is first built.
    ///
    /// The character constructor immediately resets to the per-type baseline,
    /// so this only matters for stores built directly from a template.
    pub initial_trait_value: i32,

    /// Highest rating of a trait without an explicit value list.
    pub trait_value_max: i32,

    /// Identifier that prerequisite expressions use to reference the power stat.
    pub powerstat_identifier: String,

    /// Power stat of a freshly reset character.
    pub powerstat_default: i32,

    /// Highest power stat rating.
    pub powerstat_max: i32,

    /// Morality of a freshly reset character.
    pub morality_default: i32,

    /// Highest morality rating.
    pub morality_max: i32,

    /// Derangements can only be attached at or below this morality level.
    pub derangement_morality_max: i32,

    /// Separator used when lists are flattened into a single document field.
    pub separator: String,

    /// `chrono` format string for dates stored in documents.
    pub date_format: String,

    /// Root element name of every document this program reads or writes.
    pub program_name: String,

    /// Version written into documents.
    pub version: Version,

    /// Documents with the same major version and at least this minor version
    /// can still be imported, with a warning.
    pub min_compatible_minor: u32,
}

impl SheetConfig {
    // ===== defaults =====
    pub const DEFAULT_TRAIT_MULTIPLE_MAX: usize = 3;
    pub const DEFAULT_ADULT_AGE: u32 = 13;
    pub const DEFAULT_INITIAL_AGE: u32 = 21;
    pub const DEFAULT_SPECIES: &'static str = "Human";
    pub const DEFAULT_INITIAL_TRAIT_VALUE: i32 = 2;
    pub const DEFAULT_TRAIT_VALUE_MAX: i32 = 5;
    pub const DEFAULT_POWERSTAT_IDENTIFIER: &'static str = "Powerstat";
    pub const DEFAULT_POWERSTAT: i32 = 1;
    pub const DEFAULT_POWERSTAT_MAX: i32 = 10;
    pub const DEFAULT_MORALITY: i32 = 7;
    pub const DEFAULT_MORALITY_MAX: i32 = 10;
    pub const DEFAULT_DERANGEMENT_MORALITY_MAX: i32 = 7;
    pub const DEFAULT_SEPARATOR: &'static str = ";";
    pub const DEFAULT_DATE_FORMAT: &'static str = "%Y-%m-%d";
    pub const PROGRAM_NAME: &'static str = "SoulCreator";
    pub const VERSION: Version = Version::new(0, 8, 0);
    pub const MIN_COMPATIBLE_MINOR: u32 = 7;

    pub fn new() -> Self {
        Self {
            trait_multiple_max: Self::DEFAULT_TRAIT_MULTIPLE_MAX,
            adult_age: Self::DEFAULT_ADULT_AGE,
            initial_age: Self::DEFAULT_INITIAL_AGE,
            initial_species: Self::DEFAULT_SPECIES.to_string(),
            initial_trait_value: Self::DEFAULT_INITIAL_TRAIT_VALUE,
            trait_value_max: Self::DEFAULT_TRAIT_VALUE_MAX,
            powerstat_identifier: Self::DEFAULT_POWERSTAT_IDENTIFIER.to_string(),
            powerstat_default: Self::DEFAULT_POWERSTAT,
            powerstat_max: Self::DEFAULT_POWERSTAT_MAX,
            morality_default: Self::DEFAULT_MORALITY,
            morality_max: Self::DEFAULT_MORALITY_MAX,
            derangement_morality_max: Self::DEFAULT_DERANGEMENT_MORALITY_MAX,
            separator: Self::DEFAULT_SEPARATOR.to_string(),
            date_format: Self::DEFAULT_DATE_FORMAT.to_string(),
            program_name: Self::PROGRAM_NAME.to_string(),
            version: Self::VERSION,
            min_compatible_minor: Self::MIN_COMPATIBLE_MINOR,
        }
    }

    /// Default allowed values for traits without an explicit list.
    pub fn default_value_range(&self) -> Vec<i32> {
        (0..=self.trait_value_max).collect()
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_two_and_three_components() {
        assert_eq!("0.7".parse::<Version>(), Ok(Version::new(0, 7, 0)));
        assert_eq!("1.2.3".parse::<Version>(), Ok(Version::new(1, 2, 3)));
        assert!("1".parse::<Version>().is_err());
        assert!("1.x".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
    }

    #[test]
    fn document_string_drops_change_number() {
        assert_eq!(Version::new(0, 8, 4).document_string(), "0.8");
    }

    #[test]
    fn default_value_range_spans_zero_to_max() {
        let config = SheetConfig::new();
        assert_eq!(config.default_value_range(), vec![0, 1, 2, 3, 4, 5]);
    }
}
