//! Descriptive character data: names, dates, armor.

use chrono::NaiveDate;

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
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// The character's names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    pub forenames: Vec<String>,
    pub surname: String,
    /// Name used within the character's supernatural society.
    pub honorname: String,
    pub nickname: String,
    /// Name of the supernatural persona.
    pub supername: String,
    pub gender: Gender,
}

impl Identity {
    /// First forename and surname, as shown on the sheet header.
    pub fn display_name(&self) -> String {
        let first = self.forenames.first().map(String::as_str).unwrap_or_default();
        match (first.is_empty(), self.surname.is_empty()) {
            (false, false) => format!("{first} {}", self.surname),
            (false, true) => first.to_string(),
            (true, _) => self.surname.clone(),
        }
    }
}

/// Dates of the character's life. All optional until filled in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterDates {
    pub birth: Option<NaiveDate>,
    /// Date the character became supernatural.
    pub becoming: Option<NaiveDate>,
    /// Current in-game date.
    pub game: Option<NaiveDate>,
}

impl CharacterDates {
    /// Full years between birth and the in-game date.
    pub fn age_at_game_date(&self) -> Option<u32> {
        let (birth, game) = (self.birth?, self.game?);
        game.years_since(birth)
    }
}

/// Worn armor ratings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Armor {
    /// Protection against everything except firearms and bows.
    pub general: i32,
    pub firearms: i32,
}

impl Armor {
    pub const fn new(general: i32, firearms: i32) -> Self {
        Self { general, firearms }
    }
}
