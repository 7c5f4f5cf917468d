//! Character document writer.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use sheet_core::{Character, GroupKind, TraitRecord};

use crate::document::PersistError;
use crate::xml::XmlElement;

pub struct CharacterWriter;

impl CharacterWriter {
    /// Builds the document tree for a character.
    pub fn to_element(character: &Character) -> XmlElement {
        let config = character.config();
        let date = |d: Option<NaiveDate>| {
            d.map(|d| d.format(&config.date_format).to_string())
                .unwrap_or_default()
        };
        let text = |name: &str, value: &str| XmlElement::new(name).with_text(value);

        let identity = character.identity();
        let dates = character.dates();
        let armor = character.armor();

        let mut breed = text("breed", character.group(GroupKind::Breed));
        if !character.kith().is_empty() {
            breed = breed.with_attribute("kith", character.kith());
        }

        let mut root = XmlElement::new(config.program_name.as_str())
            .with_attribute("version", config.version.document_string())
            .with_child(text("species", character.species()))
            .with_child(text("era", character.era().as_ref()))
            .with_child(
                XmlElement::new("identities").with_child(
                    XmlElement::new("identity")
                        .with_attribute("forenames", identity.forenames.join(" "))
                        .with_attribute("surname", identity.surname.as_str())
                        .with_attribute("honorname", identity.honorname.as_str())
                        .with_attribute("nickname", identity.nickname.as_str())
                        .with_attribute("supername", identity.supername.as_str())
                        .with_attribute("gender", identity.gender.to_string()),
                ),
            )
            .with_child(
                XmlElement::new("dates")
                    .with_attribute("birth", date(dates.birth))
                    .with_attribute("becoming", date(dates.becoming))
                    .with_attribute("game", date(dates.game)),
            )
            .with_child(text("virtue", character.virtue()))
            .with_child(text("vice", character.vice()))
            .with_child(breed)
            .with_child(text("faction", character.group(GroupKind::Faction)))
            .with_child(text("organisation", character.group(GroupKind::Organisation)))
            .with_child(text("party", character.group(GroupKind::Party)))
            .with_child(text("height", &meters(character.height_cm())))
            .with_child(text("weight", &character.weight_kg().to_string()))
            .with_child(text("eyes", character.eyes()))
            .with_child(text("hair", character.hair()))
            .with_child(text("nationality", character.nationality()))
            .with_child(text("description", character.description()))
            .with_child(text("powerstat", &character.powerstat().to_string()))
            .with_child(text("morality", &character.morality().to_string()));

        let mut derangements = XmlElement::new("derangements");
        for (level, name) in character.derangements() {
            derangements.push(
                XmlElement::new("derangement")
                    .with_attribute("morality", level.to_string())
                    .with_text(name.as_str()),
            );
        }
        root.push(derangements);

        root.push(text(
            "armor",
            &format!("{}{}{}", armor.general, config.separator, armor.firearms),
        ));
        root.push(traits_element(&character.export_traits(), &config.separator));
        root.push(items_element(character));

        if let Some(picture) = character.picture() {
            root.push(text("picture", &STANDARD.encode(picture)));
        }
        root
    }

    pub fn to_xml(character: &Character) -> Result<String, PersistError> {
        Ok(Self::to_element(character).to_xml_string()?)
    }

    /// Writes the document to `path` and clears the character's modified flag.
    pub fn write(character: &mut Character, path: &Path) -> Result<(), PersistError> {
        let xml = Self::to_xml(character)?;
        std::fs::write(path, xml).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        character.mark_saved();
        tracing::info!(
            target: "sheet_content::character",
            path = %path.display(),
            "character saved"
        );
        Ok(())
    }
}

/// Groups records into `Type/Category/trait`. Records arrive grouped by type
/// and category, in store order.
fn traits_element(records: &[TraitRecord], separator: &str) -> XmlElement {
    let mut traits = XmlElement::new("Traits");
    for record in records {
        let type_name: &str = record.trait_type.as_ref();
        let needs_type = traits
            .children
            .last()
            .is_none_or(|t| t.attribute("name") != Some(type_name));
        if needs_type {
            traits.push(XmlElement::new("Type").with_attribute("name", type_name));
        }
        let Some(type_element) = traits.children.last_mut() else {
            continue;
        };

        let needs_category = type_element
            .children
            .last()
            .is_none_or(|c| c.attribute("name") != Some(record.category.as_str()));
        if needs_category {
            type_element.push(XmlElement::new("Category").with_attribute("name", record.category.as_str()));
        }
        let Some(category) = type_element.children.last_mut() else {
            continue;
        };

        let mut element = XmlElement::new("trait")
            .with_attribute("name", record.name.as_str())
            .with_attribute("value", record.value.to_string());
        if let Some(custom) = &record.custom_text {
            element = element.with_attribute("customText", custom.as_str());
        }
        if !record.specialties.is_empty() {
            element.push(XmlElement::new("specialties").with_text(record.specialties.join(separator)));
        }
        category.push(element);
    }
    traits
}

fn items_element(character: &Character) -> XmlElement {
    let mut items = XmlElement::new("Items");
    if !character.weapons().is_empty() {
        let mut weapons = XmlElement::new("Weapons");
        for (category, names) in character.weapons() {
            let mut element = XmlElement::new("Category").with_attribute("name", category.as_str());
            for name in names {
                element.push(XmlElement::new("weapon").with_text(name.as_str()));
            }
            weapons.push(element);
        }
        items.push(weapons);
    }
    if !character.equipment().is_empty() {
        let mut equipment = XmlElement::new("Equipment");
        for name in character.equipment() {
            equipment.push(XmlElement::new("equipment").with_text(name.as_str()));
        }
        items.push(equipment);
    }
    items
}

/// Height is stored in centimeters and written in meters.
fn meters(cm: u32) -> String {
    format!("{}.{:02}", cm / 100, cm % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::TraitType;

    #[test]
    fn height_is_written_in_meters() {
        assert_eq!(meters(180), "1.80");
        assert_eq!(meters(5), "0.05");
    }

    #[test]
    fn records_are_grouped_by_type_and_category() {
        let records = vec![
            TraitRecord::new(TraitType::Attribute, "Mental", "Wits", 2),
            TraitRecord::new(TraitType::Attribute, "Mental", "Resolve", 1),
            TraitRecord::new(TraitType::Attribute, "Physical", "Strength", 3),
            TraitRecord::new(TraitType::Merit, "Mental", "Language", 1)
                .with_custom_text("French")
                .with_specialties(["Slang".to_string(), "Poetry".to_string()]),
        ];
        let traits = traits_element(&records, ";");

        assert_eq!(traits.children.len(), 2);
        let attributes = &traits.children[0];
        assert_eq!(attributes.attribute("name"), Some("Attribute"));
        assert_eq!(attributes.children.len(), 2);
        assert_eq!(attributes.children[0].children.len(), 2);

        let language = &traits.children[1].children[0].children[0];
        assert_eq!(language.attribute("customText"), Some("French"));
        assert_eq!(language.child("specialties").unwrap().text(), "Slang;Poetry");
    }
}
