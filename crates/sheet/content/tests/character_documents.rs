use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use sheet_content::{CharacterReader, CharacterWriter, ContentFactory, PersistError, XmlElement};
use sheet_core::{
    Armor, Character, CharacterDates, Era, Gender, GroupKind, Identity, SheetConfig, Template,
    TraitType,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../data")
}

fn shipped_content() -> (Arc<Template>, SheetConfig) {
    let factory = ContentFactory::new(data_dir());
    let config = factory.load_config().expect("shipped config should load");
    let loaded = factory
        .load_template(&config)
        .expect("shipped templates should load");
    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
    (Arc::new(loaded.template), config)
}

fn new_character() -> Character {
    let (template, config) = shipped_content();
    Character::new(template, config).expect("character should build from shipped templates")
}

#[test]
fn shipped_templates_cover_every_species() {
    let (template, config) = shipped_content();

    assert_eq!(config, SheetConfig::default());
    let species: Vec<_> = template.species_names().collect();
    assert_eq!(species, vec!["Human", "Vampire"]);

    let vampire = template.species("Vampire").unwrap();
    assert_eq!(vampire.powerstat, "Blood Potency");
    assert_eq!(vampire.powerstat_table.len(), 10);
    assert_eq!(vampire.group_items(GroupKind::Breed).len(), 2);

    // fallback item lists are skipped
    assert!(template.weapon("Club").is_none());
    assert_eq!(template.armor("Kevlar Vest").map(|a| a.firearms), Some(3));

    let devotion = template
        .definition(TraitType::Subpower, "Devotion", "Body of Will")
        .unwrap();
    assert_eq!(
        devotion.prerequisites.as_deref(),
        Some("(Resolve > 2) and (Power.Resilience > 1 and Power.Vigor > 1)")
    );
}

/// Complete save and load cycle of a vampire character.
///
/// 1. Build a character from the shipped templates
/// 2. Fill in metadata, traits and items
/// 3. Write it to disk
/// 4. Read it into a fresh character and compare
#[test]
fn character_survives_write_and_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lestat.chr");

    // ================================================================
    // PHASE 1: Fill in the sheet
    // ================================================================
    let mut written = new_character();
    written.set_species("Vampire");
    written.set_era(Era::Reason);
    written.set_identity(Identity {
        forenames: vec!["Lestat".to_string(), "Valentin".to_string()],
        surname: "de Lioncourt".to_string(),
        gender: Gender::Male,
        ..Identity::default()
    });
    written.set_dates(CharacterDates {
        birth: NaiveDate::from_ymd_opt(1760, 11, 7),
        becoming: NaiveDate::from_ymd_opt(1780, 3, 1),
        game: NaiveDate::from_ymd_opt(1790, 1, 1),
    });
    written.set_virtue("Fortitude");
    written.set_vice("Pride");
    written.set_group(GroupKind::Breed, "Daeva");
    written.set_group(GroupKind::Faction, "Invictus");
    written.set_height_cm(183);
    written.set_weight_kg(79);
    written.set_eyes("grey");
    written.set_description("Theatrical & vain <very>");
    written.set_powerstat(3).expect("powerstat in range");
    written.set_morality(5).expect("morality in range");
    written
        .set_derangement(5, Some("Fixation"))
        .expect("derangement level in range");
    written.set_armor(Armor::new(1, 0)).expect("armor is positive");
    written.add_weapon("Melee", "Sword");
    written.add_equipment("Flashlight");
    written.set_picture(Some(vec![0x89, 0x50, 0x4e, 0x47, 0x00, 0xff]));

    let wits = written.lookup(TraitType::Attribute, "Mental", "Wits").unwrap();
    written.set_trait_value(wits, 3).unwrap();
    let occult = written.lookup(TraitType::Skill, "Mental", "Occult").unwrap();
    written.set_trait_value(occult, 2).unwrap();
    written
        .set_trait_specialties(occult, vec!["Ghosts".to_string(), "Rituals".to_string()])
        .unwrap();
    let language = written.lookup(TraitType::Merit, "Mental", "Language").unwrap();
    written.set_trait_custom_text(language, "French").unwrap();
    written.set_trait_value(language, 1).unwrap();
    let herd = written.lookup(TraitType::Merit, "Supernatural", "Herd").unwrap();
    written.set_trait_value(herd, 2).unwrap();
    let resilience = written
        .lookup(TraitType::Power, "Discipline", "Resilience")
        .unwrap();
    written.set_trait_value(resilience, 2).unwrap();
    assert!(written.is_modified());

    // ================================================================
    // PHASE 2: Write
    // ================================================================
    CharacterWriter::write(&mut written, &path).expect("write should succeed");
    assert!(!written.is_modified());

    // ================================================================
    // PHASE 3: Read into a fresh character
    // ================================================================
    let mut loaded = new_character();
    let report = CharacterReader::read(&path, &mut loaded).expect("read should succeed");

    assert_eq!(report.version_warning, None);
    assert_eq!(report.traits_skipped, 0);
    assert_eq!(report.traits_applied, written.export_traits().len());
    assert!(!loaded.is_modified());

    assert_eq!(loaded.species(), "Vampire");
    assert_eq!(loaded.era(), Era::Reason);
    assert_eq!(loaded.identity(), written.identity());
    assert_eq!(loaded.dates(), written.dates());
    assert_eq!(loaded.age(), 29);
    assert_eq!(loaded.virtue(), "Fortitude");
    assert_eq!(loaded.vice(), "Pride");
    assert_eq!(loaded.group(GroupKind::Breed), "Daeva");
    assert_eq!(loaded.group(GroupKind::Faction), "Invictus");
    assert_eq!(loaded.height_cm(), 183);
    assert_eq!(loaded.weight_kg(), 79);
    assert_eq!(loaded.eyes(), "grey");
    assert_eq!(loaded.description(), "Theatrical & vain <very>");
    assert_eq!(loaded.powerstat(), 3);
    assert_eq!(loaded.morality(), 5);
    assert_eq!(loaded.derangements(), written.derangements());
    assert_eq!(loaded.armor(), Armor::new(1, 0));
    assert_eq!(loaded.weapons(), written.weapons());
    assert_eq!(loaded.equipment(), written.equipment());
    assert_eq!(loaded.picture(), written.picture());

    assert_eq!(loaded.export_traits(), written.export_traits());
    assert_eq!(loaded.derived_values(), written.derived_values());
}

#[test]
fn unknown_traits_are_skipped_and_counted() {
    let mut character = new_character();
    let document = r#"<SoulCreator version="0.8">
        <species>Human</species>
        <Traits>
          <Type name="Skill">
            <Category name="Mental">
              <trait name="Occult" value="3"/>
              <trait name="Necromancy" value="2"/>
            </Category>
          </Type>
        </Traits>
    </SoulCreator>"#;

    let report = CharacterReader::read_str(document, &mut character).unwrap();
    assert_eq!(report.traits_applied, 1);
    assert_eq!(report.traits_skipped, 1);

    let occult = character.lookup(TraitType::Skill, "Mental", "Occult").unwrap();
    assert_eq!(character.trait_entry(occult).unwrap().value(), 3);
}

#[test]
fn older_documents_load_with_a_warning() {
    let mut character = new_character();
    // root-level trait types and the old attribute spelling
    let document = r#"<SoulCreator version="0.7">
        <identities><identity forenames="Mina" surename="Murray" gender="Female"/></identities>
        <Attribute>
          <Category name="Mental"><trait name="Wits" value="4"/></Category>
        </Attribute>
    </SoulCreator>"#;

    let report = CharacterReader::read_str(document, &mut character).unwrap();
    assert!(report.version_warning.is_some());
    assert_eq!(character.identity().surname, "Murray");
    assert_eq!(character.identity().gender, Gender::Female);

    let wits = character.lookup(TraitType::Attribute, "Mental", "Wits").unwrap();
    assert_eq!(character.trait_entry(wits).unwrap().value(), 4);
}

#[test]
fn incompatible_documents_leave_the_character_untouched() {
    let mut character = new_character();
    character.set_eyes("green");

    let document = r#"<SoulCreator version="0.5"><eyes>blue</eyes></SoulCreator>"#;
    let err = CharacterReader::read_str(document, &mut character).unwrap_err();
    assert!(matches!(err, PersistError::IncompatibleVersion { .. }));

    let document = r#"<Spreadsheet version="0.8"><eyes>blue</eyes></Spreadsheet>"#;
    let err = CharacterReader::read_str(document, &mut character).unwrap_err();
    assert!(matches!(err, PersistError::WrongDocument { .. }));

    assert_eq!(character.eyes(), "green");
}

#[test]
fn oversized_measurements_are_malformed() {
    let mut character = new_character();
    let document = r#"<SoulCreator version="0.8"><height>1e12</height></SoulCreator>"#;

    let err = CharacterReader::read_str(document, &mut character).unwrap_err();
    assert!(matches!(err, PersistError::Malformed { ref element, .. } if element == "height"));
    assert_eq!(character.height_cm(), 0);

    let document = r#"<SoulCreator version="0.8"><height> 1.85 </height></SoulCreator>"#;
    CharacterReader::read_str(document, &mut character).unwrap();
    assert_eq!(character.height_cm(), 185);
}

#[test]
fn multi_line_description_is_kept_verbatim() {
    let mut character = new_character();
    let description = "Born in Leipzig.\n\n  Moved to Berlin in 1923.";
    character.set_description(description);

    let xml = CharacterWriter::to_xml(&character).unwrap();
    let mut restored = new_character();
    CharacterReader::read_str(&xml, &mut restored).unwrap();
    assert_eq!(restored.description(), description);
}

#[test]
fn written_document_has_version_and_grouped_traits() {
    let character = new_character();
    let xml = CharacterWriter::to_xml(&character).unwrap();
    let root = XmlElement::parse(&xml).unwrap();

    assert_eq!(root.name, "SoulCreator");
    assert_eq!(root.attribute("version"), Some("0.8"));

    let types: Vec<_> = root
        .child("Traits")
        .unwrap()
        .children_named("Type")
        .filter_map(|t| t.attribute("name"))
        .collect();
    // baselines: attributes at 1, everything else at 0
    assert_eq!(types, vec!["Attribute"]);
    assert!(root.child("picture").is_none());
}
