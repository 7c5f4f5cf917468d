//! Character document reader.
//!
//! Reading resets the character, applies every known field and imports the
//! trait records through [`Character::import_traits`]. Records for traits the
//! current template lacks are skipped and counted. Unknown elements are
//! ignored, so documents from neighbouring versions load as far as possible.

use std::path::Path;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use sheet_core::{
    Armor, Character, CharacterDates, Era, Gender, GroupKind, Identity, SheetConfig, TraitRecord,
    TraitType,
};

use crate::document::{PersistError, ReadReport};
use crate::version::check_version;
use crate::xml::XmlElement;

pub struct CharacterReader;

impl CharacterReader {
    pub fn read(path: &Path, character: &mut Character) -> Result<ReadReport, PersistError> {
        let content = std::fs::read_to_string(path).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let report = Self::read_str(&content, character)?;
        tracing::info!(
            target: "sheet_content::character",
            path = %path.display(),
            applied = report.traits_applied,
            skipped = report.traits_skipped,
            "character loaded"
        );
        Ok(report)
    }

    /// Reads a document into `character`.
    ///
    /// Version and document-kind problems are detected before the character
    /// is touched. A malformed field aborts the read and leaves the
    /// character partially loaded.
    pub fn read_str(input: &str, character: &mut Character) -> Result<ReadReport, PersistError> {
        let root = XmlElement::parse(input)?;
        let config = character.config().clone();
        let version_warning = check_version(
            &root.name,
            root.attribute("version").unwrap_or_default(),
            &config,
        )?;
        if let Some(warning) = &version_warning {
            tracing::warn!(target: "sheet_content::character", %warning, "importing older document");
        }

        character.reset();
        let mut records = Vec::new();
        for element in &root.children {
            read_element(element, character, &config, &mut records)?;
        }
        let summary = character.import_traits(&records);
        character.mark_saved();

        Ok(ReadReport {
            version_warning,
            traits_applied: summary.applied,
            traits_skipped: summary.skipped,
        })
    }
}

fn read_element(
    element: &XmlElement,
    character: &mut Character,
    config: &SheetConfig,
    records: &mut Vec<TraitRecord>,
) -> Result<(), PersistError> {
    let text = element.text();
    match element.name.as_str() {
        "species" => character.set_species(text),
        "era" => character.set_era(parse_or_default::<Era>(element)?),
        "identities" => {
            // Only one identity is supported; the first wins.
            if let Some(identity) = element.child("identity") {
                character.set_identity(read_identity(identity)?);
            }
        }
        "dates" => character.set_dates(CharacterDates {
            birth: read_date(element, "birth", config)?,
            becoming: read_date(element, "becoming", config)?,
            game: read_date(element, "game", config)?,
        }),
        "virtue" => character.set_virtue(text),
        "vice" => character.set_vice(text),
        "breed" => {
            character.set_group(GroupKind::Breed, text);
            character.set_kith(element.attribute("kith").unwrap_or_default());
        }
        "faction" => character.set_group(GroupKind::Faction, text),
        "organisation" => character.set_group(GroupKind::Organisation, text),
        "party" => character.set_group(GroupKind::Party, text),
        "height" => character.set_height_cm(scaled(element, 100.0)?),
        "weight" => character.set_weight_kg(scaled(element, 1.0)?),
        "eyes" => character.set_eyes(text),
        "hair" => character.set_hair(text),
        "nationality" => character.set_nationality(text),
        "description" => character.set_description(text),
        "powerstat" => {
            if let Some(value) = parse_number::<i32>(element)? {
                character.set_powerstat(value)?;
            }
        }
        "morality" => {
            if let Some(value) = parse_number::<i32>(element)? {
                character.set_morality(value)?;
            }
        }
        "derangements" => {
            for derangement in element.children_named("derangement") {
                let level = derangement
                    .attribute("morality")
                    .unwrap_or_default()
                    .parse::<i32>()
                    .map_err(|e| PersistError::malformed("derangement", e))?;
                character.set_derangement(level, Some(derangement.text()))?;
            }
        }
        "armor" => character.set_armor(read_armor(element, &config.separator)?)?,
        "Traits" => {
            for type_element in element.children_named("Type") {
                let name = type_element.attribute("name").unwrap_or_default();
                read_type(type_element, name, &config.separator, records)?;
            }
        }
        "Items" => read_items(element, character),
        "picture" => {
            if !text.is_empty() {
                let bytes = STANDARD
                    .decode(text.trim())
                    .map_err(|e| PersistError::malformed("picture", e))?;
                character.set_picture(Some(bytes));
            }
        }
        other => {
            // Older documents place trait types directly below the root.
            if TraitType::from_str(other).is_ok() {
                read_type(element, other, &config.separator, records)?;
            } else {
                tracing::debug!(
                    target: "sheet_content::character",
                    element = other,
                    "unknown element ignored"
                );
            }
        }
    }
    Ok(())
}

fn read_identity(element: &XmlElement) -> Result<Identity, PersistError> {
    let attribute = |key: &str| element.attribute(key).unwrap_or_default().to_string();
    let gender = match element.non_empty_attribute("gender") {
        Some(gender) => gender
            .parse::<Gender>()
            .map_err(|e| PersistError::malformed("identity", e))?,
        None => Gender::default(),
    };

    Ok(Identity {
        forenames: element
            .attribute("forenames")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        // Early versions misspelled the attribute.
        surname: element
            .attribute("surname")
            .or_else(|| element.attribute("surename"))
            .unwrap_or_default()
            .to_string(),
        honorname: attribute("honorname"),
        nickname: attribute("nickname"),
        supername: attribute("supername"),
        gender,
    })
}

fn read_date(
    element: &XmlElement,
    key: &str,
    config: &SheetConfig,
) -> Result<Option<NaiveDate>, PersistError> {
    element
        .non_empty_attribute(key)
        .map(|value| NaiveDate::parse_from_str(value, &config.date_format))
        .transpose()
        .map_err(|e| PersistError::malformed("dates", format!("{key}: {e}")))
}

fn read_armor(element: &XmlElement, separator: &str) -> Result<Armor, PersistError> {
    let text = element.text();
    if text.is_empty() {
        return Ok(Armor::default());
    }
    let values = text
        .split(separator)
        .map(|v| v.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PersistError::malformed("armor", e))?;
    match values.as_slice() {
        [general, firearms] => Ok(Armor::new(*general, *firearms)),
        _ => Err(PersistError::malformed(
            "armor",
            format!("expected two values, found '{text}'"),
        )),
    }
}

fn read_type(
    element: &XmlElement,
    type_name: &str,
    separator: &str,
    records: &mut Vec<TraitRecord>,
) -> Result<(), PersistError> {
    let trait_type = TraitType::from_str(type_name)
        .map_err(|_| PersistError::malformed("Type", format!("unknown trait type '{type_name}'")))?;

    for category in &element.children {
        let category_name = category.non_empty_attribute("name").unwrap_or(&category.name);
        for entry in category.children_named("trait") {
            let name = entry
                .attribute("name")
                .ok_or_else(|| PersistError::malformed("trait", "missing name"))?;
            let value = entry
                .attribute("value")
                .unwrap_or("0")
                .parse::<i32>()
                .map_err(|e| PersistError::malformed("trait", format!("{name}: {e}")))?;

            let mut record = TraitRecord::new(trait_type, category_name, name, value);
            if let Some(text) = entry.non_empty_attribute("customText") {
                record = record.with_custom_text(text);
            }
            if let Some(specialties) = entry.child("specialties").filter(|s| !s.text().is_empty()) {
                record = record.with_specialties(
                    specialties
                        .text()
                        .split(separator)
                        .map(str::to_string)
                        .collect::<Vec<_>>(),
                );
            }
            records.push(record);
        }
    }
    Ok(())
}

fn read_items(element: &XmlElement, character: &mut Character) {
    for weapons in element.children_named("Weapons") {
        for category in weapons.children_named("Category") {
            let category_name = category.attribute("name").unwrap_or_default();
            for weapon in category.children_named("weapon") {
                character.add_weapon(category_name, weapon.text());
            }
        }
    }
    for equipment in element.children_named("Equipment") {
        for item in equipment.children_named("equipment") {
            character.add_equipment(item.text());
        }
    }
}

fn parse_or_default<T>(element: &XmlElement) -> Result<T, PersistError>
where
    T: FromStr + Default,
    T::Err: core::fmt::Display,
{
    let text = element.text().trim();
    if text.is_empty() {
        return Ok(T::default());
    }
    text.parse()
        .map_err(|e| PersistError::malformed(&element.name, e))
}

fn parse_number<T>(element: &XmlElement) -> Result<Option<T>, PersistError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let text = element.text().trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|e| PersistError::malformed(&element.name, e))
}

/// Parses a decimal quantity and converts it to whole units.
fn scaled(element: &XmlElement, factor: f64) -> Result<u32, PersistError> {
    let Some(value) = parse_number::<f64>(element)? else {
        return Ok(0);
    };
    if !value.is_finite() || value < 0.0 {
        return Err(PersistError::malformed(&element.name, "must be a positive number"));
    }
    let units = (value * factor).round();
    if units > f64::from(u32::MAX) {
        return Err(PersistError::malformed(&element.name, "is too large"));
    }
    Ok(units as u32)
}
