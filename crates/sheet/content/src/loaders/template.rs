//! Rule template loader.
//!
//! A template directory holds one XML document per species (plus species-less
//! documents with the shared traits). Each document looks like:
//!
//! ```text
//! <SoulCreator version="0.8">
//!   <Template species="Vampire">
//!     <Traits morale="Humanity" powerstat="Blood Potency" fuel="Vitae">
//!       <Virtue><trait name="Charity"/></Virtue>
//!       <Merit>
//!         <Category name="Physical">
//!           <trait name="Giant"><value>4</value></trait>
//!         </Category>
//!       </Merit>
//!       <Subpower name="Devotions">
//!         <Category name="Devotion">
//!           <trait name="Body of Will" level="1"><power value="2">Resilience</power></trait>
//!         </Category>
//!       </Subpower>
//!       <Powerstat><powerstat fuelMax="10" fuelPerTurn="1" traitMax="5">1</powerstat></Powerstat>
//!       <Derangement><mild name="Fixation"><severe name="Obsession"/></mild></Derangement>
//!     </Traits>
//!     <Creation><Type name="Attribute"><points value="5"/></Type></Creation>
//!     <Group><Breed name="Clan"><item name="Daeva"/></Breed></Group>
//!     <Items>...</Items>
//!   </Template>
//! </SoulCreator>
//! ```
//!
//! Traits of a document with a `species` attribute are restricted to that
//! species.

use std::path::{Path, PathBuf};

use anyhow::Context;
use sheet_core::{
    AgeCategory, ArmorData, Characteristic, DerangementData, EquipmentData, Era, GroupItem,
    GroupKind, GroupTitle, Kith, PowerstatEntry, SevereDerangement, SheetConfig, Template,
    TraitDefinition, TraitType, WeaponData,
};

use crate::loaders::{LoadResult, read_file};
use crate::version::{VersionWarning, check_version};
use crate::xml::XmlElement;

/// A soft version mismatch found while loading one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateWarning {
    /// File name, or `<inline>` for documents loaded from a string.
    pub source: String,
    pub warning: VersionWarning,
}

/// A merged template together with the soft warnings raised while loading it.
#[derive(Clone, Debug, Default)]
pub struct LoadedTemplate {
    pub template: Template,
    pub warnings: Vec<TemplateWarning>,
}

/// Loader for rule templates from XML files.
pub struct TemplateLoader;

impl TemplateLoader {
    /// Loads and merges every `*.xml` file of a directory, in file name order.
    pub fn load_dir(dir: &Path, config: &SheetConfig) -> LoadResult<LoadedTemplate> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read template directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
            .collect();
        files.sort();

        let mut loaded = LoadedTemplate::default();
        for path in &files {
            let content = read_file(path)?;
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let document = Self::parse_document(&content, &source, config)
                .with_context(|| format!("Failed to load template {}", path.display()))?;
            loaded.template.merge(document.template);
            loaded.warnings.extend(document.warnings);
        }

        tracing::info!(
            target: "sheet_content::template",
            dir = %dir.display(),
            files = files.len(),
            traits = loaded.template.trait_count(),
            warnings = loaded.warnings.len(),
            "template loaded"
        );
        Ok(loaded)
    }

    /// Loads a single template document.
    pub fn load_str(content: &str, config: &SheetConfig) -> LoadResult<LoadedTemplate> {
        Self::parse_document(content, "<inline>", config)
    }

    fn parse_document(
        content: &str,
        source: &str,
        config: &SheetConfig,
    ) -> LoadResult<LoadedTemplate> {
        let root = XmlElement::parse(content)?;
        let mut loaded = LoadedTemplate::default();

        if let Some(warning) = check_version(
            &root.name,
            root.attribute("version").unwrap_or_default(),
            config,
        )? {
            tracing::warn!(
                target: "sheet_content::template",
                source,
                %warning,
                "template from another version, loading anyway"
            );
            loaded.warnings.push(TemplateWarning {
                source: source.to_string(),
                warning,
            });
        }

        let template_element = root
            .child("Template")
            .context("document has no <Template> element")?;
        let species = template_element.non_empty_attribute("species");
        let template = &mut loaded.template;

        if let Some(traits) = template_element.child("Traits") {
            read_traits(template, traits, species)?;
        }
        if let Some(species) = species {
            if let Some(creation) = template_element.child("Creation") {
                read_creation_points(template, creation, species)?;
            }
            if let Some(groups) = template_element.child("Group") {
                read_groups(template, groups, species);
            }
        }
        for items in template_element.children_named("Items") {
            read_items(template, items)?;
        }

        tracing::debug!(
            target: "sheet_content::template",
            source,
            species = species.unwrap_or("<shared>"),
            traits = loaded.template.trait_count(),
            "template document parsed"
        );
        Ok(loaded)
    }
}

fn read_traits(template: &mut Template, traits: &XmlElement, species: Option<&str>) -> LoadResult<()> {
    if let Some(species) = species {
        let data = template.species_entry(species);
        data.morale = traits.attribute("morale").unwrap_or_default().to_string();
        data.powerstat = traits.attribute("powerstat").unwrap_or_default().to_string();
        data.fuel = traits.attribute("fuel").unwrap_or_default().to_string();
    }

    for section in &traits.children {
        match section.name.as_str() {
            "Virtue" | "Vice" => {
                for entry in section.descendants("trait") {
                    let characteristic = read_characteristic(entry)?;
                    if section.name == "Virtue" {
                        template.add_virtue(characteristic);
                    } else {
                        template.add_vice(characteristic);
                    }
                }
            }
            "Attribute" | "Skill" | "Merit" | "Flaw" | "Power" => {
                let trait_type: TraitType = section.name.parse()?;
                if let (TraitType::Power, Some(species)) = (trait_type, species) {
                    template.species_entry(species).power_name =
                        section.non_empty_attribute("name").map(str::to_string);
                }
                for category in section.descendants("Category") {
                    let category_name = required(category, "name")?;
                    for entry in category.descendants("trait") {
                        template.add_trait(trait_type, category_name, read_definition(entry, species)?);
                    }
                }
            }
            "Subpower" => read_subpowers(template, section, species)?,
            "Powerstat" => {
                if let Some(species) = species {
                    read_powerstat(template, section, species)?;
                }
            }
            "Derangement" => {
                if let Some(species) = species {
                    read_derangements(template, section, species)?;
                }
            }
            other => tracing::debug!(
                target: "sheet_content::template",
                element = other,
                "unknown trait section ignored"
            ),
        }
    }
    Ok(())
}

fn read_characteristic(entry: &XmlElement) -> LoadResult<Characteristic> {
    let mut characteristic = Characteristic::new(required(entry, "name")?);
    if let Some(age) = entry.non_empty_attribute("age") {
        characteristic.age = age
            .parse::<AgeCategory>()
            .with_context(|| format!("invalid age '{age}'"))?;
    }
    Ok(characteristic)
}

fn read_definition(entry: &XmlElement, species: Option<&str>) -> LoadResult<TraitDefinition> {
    let name = required(entry, "name")?;
    let identifier = entry.non_empty_attribute("id").unwrap_or(name);
    let mut definition = TraitDefinition::new(identifier, name)
        .with_custom(is_true(entry.attribute("custom")));

    if let Some(species) = species {
        definition = definition.with_species(species);
    }
    if let Some(age) = entry.non_empty_attribute("age") {
        let age = age
            .parse::<AgeCategory>()
            .with_context(|| format!("{name}: invalid age '{age}'"))?;
        definition = definition.with_age(age);
    }
    if let Some(era) = entry.non_empty_attribute("era") {
        let era = era
            .parse::<Era>()
            .with_context(|| format!("{name}: invalid era '{era}'"))?;
        definition = definition.with_era(era);
    }
    if let Some(level) = entry.non_empty_attribute("level") {
        let level = level
            .parse::<u32>()
            .with_context(|| format!("{name}: invalid level '{level}'"))?;
        definition = definition.with_level(level);
    }

    let values = entry
        .descendants("value")
        .into_iter()
        .map(|v| {
            v.text()
                .trim()
                .parse::<i32>()
                .with_context(|| format!("{name}: invalid value '{}'", v.text()))
        })
        .collect::<LoadResult<Vec<_>>>()?;
    if !values.is_empty() {
        definition = definition.with_values(values);
    }

    let mut specialties: Vec<String> = entry
        .descendants("specialty")
        .into_iter()
        .map(|s| s.text().to_string())
        .collect();
    specialties.sort();
    definition = definition.with_specialties(specialties);

    let prerequisites: Vec<&str> = entry
        .descendants("prerequisites")
        .into_iter()
        .map(XmlElement::text)
        .filter(|t| !t.is_empty())
        .collect();
    if !prerequisites.is_empty() {
        definition = definition.with_prerequisites(prerequisites.join(" and "));
    }

    Ok(definition)
}

/// Subpowers carry their power requirements as `<power value="n">Name</power>`
/// children. Each becomes a `Power.Name > n-1` clause, joined with the
/// explicit prerequisites by `and`. Category-level `<only>` lists apply to
/// every subpower of the category.
fn read_subpowers(template: &mut Template, section: &XmlElement, species: Option<&str>) -> LoadResult<()> {
    if let Some(species) = species {
        template.species_entry(species).subpower_name =
            section.non_empty_attribute("name").map(str::to_string);
    }

    for category in section.children_named("Category") {
        let category_name = required(category, "name")?;
        let shared_only: Vec<String> = category
            .children_named("only")
            .map(|o| o.text().to_string())
            .collect();

        for entry in category.children_named("trait") {
            let name = required(entry, "name")?;
            let identifier = entry.non_empty_attribute("id").unwrap_or(name);
            let mut definition = TraitDefinition::new(identifier, name);
            if let Some(species) = species {
                definition = definition.with_species(species);
            }
            if let Some(level) = entry.non_empty_attribute("level") {
                let level = level
                    .parse::<u32>()
                    .with_context(|| format!("{name}: invalid level '{level}'"))?;
                definition = definition.with_level(level);
            }

            let mut clauses: Vec<String> = entry
                .children_named("prerequisites")
                .filter(|p| !p.text().is_empty())
                .map(|p| format!("({})", p.text()))
                .collect();
            let mut powers: Vec<String> = Vec::new();
            for power in entry.children_named("power") {
                let value = required(power, "value")?
                    .parse::<i32>()
                    .with_context(|| format!("{name}: invalid power value"))?;
                let clause = format!("Power.{} > {}", power.text(), value - 1);
                if !powers.contains(&clause) {
                    powers.push(clause);
                }
            }
            if !powers.is_empty() {
                clauses.push(format!("({})", powers.join(" and ")));
            }
            if !clauses.is_empty() {
                definition = definition.with_prerequisites(clauses.join(" and "));
            }

            let only: Vec<String> = if shared_only.is_empty() {
                entry
                    .children_named("only")
                    .map(|o| o.text().to_string())
                    .collect()
            } else {
                shared_only.clone()
            };
            definition = definition.with_only(only);

            template.add_trait(TraitType::Subpower, category_name, definition);
        }
    }
    Ok(())
}

fn read_creation_points(template: &mut Template, creation: &XmlElement, species: &str) -> LoadResult<()> {
    for type_element in creation.descendants("Type") {
        let type_name = required(type_element, "name")?;
        let points = type_element
            .descendants("points")
            .into_iter()
            .map(|p| {
                required(p, "value")?
                    .parse::<i32>()
                    .with_context(|| format!("invalid creation points for {type_name}"))
            })
            .collect::<LoadResult<Vec<_>>>()?;
        template
            .species_entry(species)
            .creation_points
            .insert(type_name.to_string(), points);
    }
    Ok(())
}

fn read_groups(template: &mut Template, groups: &XmlElement, species: &str) {
    for kind in GroupKind::ALL {
        let Some(group) = groups.child(kind.as_ref()) else {
            continue;
        };
        let items = group
            .children_named("item")
            .filter_map(|item| {
                let mut group_item = GroupItem::new(item.non_empty_attribute("name")?);
                group_item.weakness = item.child("weakness").map(|w| w.text().to_string());
                group_item.blessing = item.child("blessing").map(|b| b.text().to_string());
                group_item.kiths = item
                    .children_named("kith")
                    .map(|kith| Kith {
                        name: kith.attribute("name").unwrap_or_default().to_string(),
                        abilities: kith
                            .children_named("ability")
                            .map(XmlElement::text)
                            .collect::<Vec<_>>()
                            .join(" "),
                    })
                    .collect();
                Some(group_item)
            })
            .collect();

        template.species_entry(species).groups.insert(
            kind,
            GroupTitle {
                title: group.attribute("name").unwrap_or_default().to_string(),
                items,
            },
        );
    }
}

fn read_powerstat(template: &mut Template, section: &XmlElement, species: &str) -> LoadResult<()> {
    for entry in section.descendants("powerstat") {
        let level = entry
            .text()
            .trim()
            .parse::<i32>()
            .with_context(|| format!("invalid powerstat level '{}'", entry.text()))?;
        let data = PowerstatEntry {
            fuel_max: number(entry, "fuelMax")?,
            fuel_per_turn: number(entry, "fuelPerTurn")?,
            trait_max: number(entry, "traitMax")?,
        };
        template
            .species_entry(species)
            .powerstat_table
            .insert(level, data);
    }
    Ok(())
}

fn read_derangements(template: &mut Template, section: &XmlElement, species: &str) -> LoadResult<()> {
    for mild in section.descendants("mild") {
        let description = |element: &XmlElement| {
            element
                .child("description")
                .map(|d| d.text().to_string())
                .unwrap_or_default()
        };
        let severe = mild
            .children_named("severe")
            .map(|s| {
                Ok(SevereDerangement {
                    name: required(s, "name")?.to_string(),
                    description: description(s),
                })
            })
            .collect::<LoadResult<Vec<_>>>()?;
        template
            .species_entry(species)
            .derangements
            .push(DerangementData {
                name: required(mild, "name")?.to_string(),
                description: description(mild),
                severe,
            });
    }
    Ok(())
}

/// Item sections marked `fallback="True"` are alternatives for installations
/// without the full catalog and are skipped.
fn read_items(template: &mut Template, items: &XmlElement) -> LoadResult<()> {
    let active = |section: &&XmlElement| !is_true(section.attribute("fallback"));

    for weapons in items.children_named("Weapons").filter(active) {
        for type_element in weapons.children_named("Type") {
            let type_name = type_element.attribute("name").unwrap_or_default();
            for weapon in type_element.descendants("weapon") {
                let attribute = |key: &str| weapon.attribute(key).unwrap_or_default().to_string();
                template.add_weapon(
                    type_name,
                    required(weapon, "name")?,
                    WeaponData {
                        damage: attribute("damage"),
                        ranges: attribute("ranges"),
                        capacity: attribute("capacity"),
                        strength: attribute("strength"),
                        size: attribute("size"),
                        durability: attribute("durability"),
                    },
                );
            }
        }
    }
    for armor in items.children_named("Armor").filter(active) {
        for entry in armor.descendants("armor") {
            template.add_armor(
                required(entry, "name")?,
                ArmorData {
                    general: number(entry, "general")?,
                    firearms: number(entry, "firearms")?,
                    defense: number(entry, "defense")?,
                    speed: number(entry, "speed")?,
                },
            );
        }
    }
    for equipment in items.children_named("Equipment").filter(active) {
        for entry in equipment.descendants("equipment") {
            template.add_equipment(
                required(entry, "name")?,
                EquipmentData {
                    durability: number(entry, "durability")?,
                    size: number(entry, "size")?,
                    cost: number(entry, "cost")?,
                },
            );
        }
    }
    Ok(())
}

// ===== helpers =====

fn required<'a>(element: &'a XmlElement, key: &str) -> LoadResult<&'a str> {
    element
        .non_empty_attribute(key)
        .with_context(|| format!("<{}> without '{}' attribute", element.name, key))
}

/// Integer attribute; a missing attribute counts as 0.
fn number(element: &XmlElement, key: &str) -> LoadResult<i32> {
    match element.non_empty_attribute(key) {
        Some(value) => value
            .parse::<i32>()
            .with_context(|| format!("<{}> has invalid {key} '{value}'", element.name)),
        None => Ok(0),
    }
}

fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}
