//! Fixed enumerations that classify traits and their eligibility filters.

/// Top-level trait classification.
///
/// The declaration order is significant: the store iterates types in this
/// order, and prerequisite name resolution picks the first type that knows a
/// name. String forms equal the element names used in rule documents.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum TraitType {
    Virtue,
    Vice,
    /// Physical, mental and social ratings every character has
    Attribute,
    Skill,
    Merit,
    Flaw,
    /// Species-specific supernatural powers
    Power,
    /// Powers that require a minimum rating in one or more `Power` traits
    Subpower,
    Derangement,
}

impl TraitType {
    pub const ALL: [TraitType; 9] = [
        Self::Virtue,
        Self::Vice,
        Self::Attribute,
        Self::Skill,
        Self::Merit,
        Self::Flaw,
        Self::Power,
        Self::Subpower,
        Self::Derangement,
    ];

    /// Value a trait of this type takes on a freshly reset character.
    pub const fn baseline(&self) -> i32 {
        match self {
            Self::Attribute => 1,
            _ => 0,
        }
    }

    /// Whether traits of this type carry a bonus part (value granted by
    /// external sources such as powers or equipment).
    pub const fn supports_bonus(&self) -> bool {
        matches!(self, Self::Attribute | Self::Skill)
    }
}

/// Age bracket a trait is restricted to.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum AgeCategory {
    /// No restriction
    #[default]
    All,
    Adult,
    Kid,
}

impl AgeCategory {
    /// Bracket of a character with the given age.
    pub const fn of(age: u32, adult_age: u32) -> Self {
        if age < adult_age {
            Self::Kid
        } else {
            Self::Adult
        }
    }

    /// Returns true if a trait restricted to `self` applies to `other`.
    pub fn admits(&self, other: AgeCategory) -> bool {
        *self == Self::All || other == Self::All || *self == other
    }
}

/// Historical era a trait is restricted to.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Era {
    /// No restriction
    #[default]
    All,
    Modern,
    Reason,
    Antique,
}

impl Era {
    /// Returns true if a trait restricted to `self` applies in era `other`.
    pub fn admits(&self, other: Era) -> bool {
        *self == Self::All || other == Self::All || *self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_type_round_trips_through_document_names() {
        for kind in TraitType::ALL {
            let name = kind.to_string();
            assert_eq!(name.parse::<TraitType>(), Ok(kind));
        }
        assert_eq!("subpower".parse::<TraitType>(), Ok(TraitType::Subpower));
    }

    #[test]
    fn only_attributes_have_nonzero_baseline() {
        assert_eq!(TraitType::Attribute.baseline(), 1);
        assert_eq!(TraitType::Skill.baseline(), 0);
        assert_eq!(TraitType::Merit.baseline(), 0);
    }

    #[test]
    fn age_category_follows_adult_threshold() {
        assert_eq!(AgeCategory::of(12, 13), AgeCategory::Kid);
        assert_eq!(AgeCategory::of(13, 13), AgeCategory::Adult);
        assert!(AgeCategory::All.admits(AgeCategory::Kid));
        assert!(!AgeCategory::Adult.admits(AgeCategory::Kid));
    }
}
