//! Furniture catalog: items, models, colors, materials and relay vocabulary
//!
//! Read-only reference data. The bundled defaults are used unless a JSON
//! catalog file is configured and loads cleanly.

use super::normalize::{contains_term, normalize, Language};
use crate::relay::SceneCommand;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Complete catalog used by the intent resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub furniture: Vec<FurnitureCategory>,
    /// Checked after every category key, in order
    #[serde(default)]
    pub item_synonyms: Vec<Synonym>,
    pub colors: Vec<ColorEntry>,
    /// Checked after every color name, in order
    #[serde(default)]
    pub color_synonyms: Vec<Synonym>,
    #[serde(default)]
    pub materials: Vec<MaterialEntry>,
    #[serde(default)]
    pub relay: RelayVocabulary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FurnitureCategory {
    pub key: String,
    #[serde(default)]
    pub english: Option<String>,
    pub models: Vec<FurnitureModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FurnitureModel {
    pub name: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorEntry {
    pub name: String,
    #[serde(default)]
    pub english: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub name: String,
    #[serde(default)]
    pub english: Option<String>,
}

/// Alternate spelling that resolves to a canonical catalog name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synonym {
    pub term: String,
    pub canonical: String,
}

impl Synonym {
    fn new(term: &str, canonical: &str) -> Self {
        Self {
            term: term.to_string(),
            canonical: canonical.to_string(),
        }
    }
}

/// Mapping from local vocabulary to the names the scene client understands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayVocabulary {
    pub objects: Vec<RelayAlias>,
    pub colors: Vec<RelayAlias>,
    pub default_object: String,
    pub default_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayAlias {
    pub local: String,
    pub relay: String,
}

impl RelayAlias {
    fn new(local: &str, relay: &str) -> Self {
        Self {
            local: local.to_string(),
            relay: relay.to_string(),
        }
    }
}

impl Default for RelayVocabulary {
    fn default() -> Self {
        Self {
            objects: vec![
                RelayAlias::new("كنبة", "Sofa"),
                RelayAlias::new("كرسي", "Chair"),
                RelayAlias::new("ترابيزة", "Table"),
            ],
            colors: vec![
                RelayAlias::new("أحمر", "Red"),
                RelayAlias::new("أزرق", "Blue"),
                RelayAlias::new("أخضر", "Green"),
                RelayAlias::new("أصفر", "Yellow"),
                RelayAlias::new("أسود", "Black"),
                RelayAlias::new("أبيض", "White"),
            ],
            default_object: "Cube".to_string(),
            default_color: "White".to_string(),
        }
    }
}

impl RelayVocabulary {
    /// Build the scene command for a remembered item, falling back to the
    /// default object/color for anything outside the lookup table.
    pub fn create_command(&self, item: &str, color: &str) -> SceneCommand {
        let object = lookup(&self.objects, item).unwrap_or(&self.default_object);
        let color = lookup(&self.colors, color).unwrap_or(&self.default_color);
        SceneCommand::CreateObject {
            object: object.clone(),
            color: color.clone(),
        }
    }
}

fn lookup<'a>(aliases: &'a [RelayAlias], local: &str) -> Option<&'a String> {
    let wanted = normalize(local);
    aliases
        .iter()
        .find(|alias| normalize(&alias.local) == wanted)
        .map(|alias| &alias.relay)
}

impl Catalog {
    /// Bundled catalog: three furniture categories, ten colors, six materials
    #[allow(clippy::too_many_lines)]
    pub fn builtin() -> Self {
        fn model(name: &str, colors: &[&str], materials: &[&str]) -> FurnitureModel {
            FurnitureModel {
                name: name.to_string(),
                colors: colors.iter().map(ToString::to_string).collect(),
                materials: materials.iter().map(ToString::to_string).collect(),
            }
        }
        fn color(name: &str, english: &str) -> ColorEntry {
            ColorEntry {
                name: name.to_string(),
                english: Some(english.to_string()),
            }
        }
        fn material(name: &str, english: &str) -> MaterialEntry {
            MaterialEntry {
                name: name.to_string(),
                english: Some(english.to_string()),
            }
        }

        let furniture = vec![
            FurnitureCategory {
                key: "كنبة".to_string(),
                english: Some("sofa".to_string()),
                models: vec![
                    model(
                        "كنبة مودرن 3 أفراد",
                        &["أحمر", "أزرق", "رمادي", "أسود"],
                        &["قماش", "جلد"],
                    ),
                    model(
                        "كنبة كلاسيك منجدة",
                        &["بني", "ذهبي", "أخضر", "أبيض"],
                        &["قماش", "جلد"],
                    ),
                ],
            },
            FurnitureCategory {
                key: "كرسي".to_string(),
                english: Some("chair".to_string()),
                models: vec![
                    model(
                        "كرسي مكتب دوار",
                        &["أسود", "رمادي", "أزرق"],
                        &["بلاستيك", "معدن"],
                    ),
                    model("كرسي سفرة خشب", &["بني", "أبيض", "أصفر"], &["خشب"]),
                ],
            },
            FurnitureCategory {
                key: "ترابيزة".to_string(),
                english: Some("table".to_string()),
                models: vec![
                    model("ترابيزة سفرة خشب", &["بني", "أبيض"], &["خشب"]),
                    model(
                        "ترابيزة قهوة مودرن",
                        &["أسود", "أبيض", "ذهبي"],
                        &["زجاج", "معدن"],
                    ),
                ],
            },
        ];

        let item_synonyms = [
            ("أريكة", "كنبة"),
            ("كنبيه", "كنبة"),
            ("كنب", "كنبة"),
            ("سوفا", "كنبة"),
            ("sofa", "كنبة"),
            ("couch", "كنبة"),
            ("كراسي", "كرسي"),
            ("كورسي", "كرسي"),
            ("مقعد", "كرسي"),
            ("chair", "كرسي"),
            ("seat", "كرسي"),
            ("تربيزة", "ترابيزة"),
            ("طاولة", "ترابيزة"),
            ("منضدة", "ترابيزة"),
            ("table", "ترابيزة"),
            ("desk", "ترابيزة"),
        ]
        .iter()
        .map(|(term, canonical)| Synonym::new(term, canonical))
        .collect();

        let colors = vec![
            color("أحمر", "red"),
            color("أزرق", "blue"),
            color("أخضر", "green"),
            color("أصفر", "yellow"),
            color("أسود", "black"),
            color("أبيض", "white"),
            color("رمادي", "gray"),
            color("بني", "brown"),
            color("ذهبي", "gold"),
            color("فضي", "silver"),
        ];

        let color_synonyms = [
            ("حمرا", "أحمر"),
            ("زرقا", "أزرق"),
            ("خضرا", "أخضر"),
            ("صفرا", "أصفر"),
            ("سودا", "أسود"),
            ("بيضا", "أبيض"),
            ("دهبي", "ذهبي"),
            ("red", "أحمر"),
            ("blue", "أزرق"),
            ("green", "أخضر"),
            ("yellow", "أصفر"),
            ("black", "أسود"),
            ("white", "أبيض"),
            ("gray", "رمادي"),
            ("grey", "رمادي"),
            ("brown", "بني"),
            ("gold", "ذهبي"),
            ("silver", "فضي"),
        ]
        .iter()
        .map(|(term, canonical)| Synonym::new(term, canonical))
        .collect();

        let materials = vec![
            material("خشب", "wood"),
            material("معدن", "metal"),
            material("زجاج", "glass"),
            material("قماش", "fabric"),
            material("جلد", "leather"),
            material("بلاستيك", "plastic"),
        ];

        Self {
            furniture,
            item_synonyms,
            colors,
            color_synonyms,
            materials,
            relay: RelayVocabulary::default(),
        }
    }

    /// Load and validate a JSON catalog file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.furniture.is_empty() {
            return Err(CatalogError::Invalid("no furniture categories".to_string()));
        }
        if let Some(empty) = self.furniture.iter().find(|c| c.models.is_empty()) {
            return Err(CatalogError::Invalid(format!(
                "category '{}' has no models",
                empty.key
            )));
        }
        if self.colors.is_empty() {
            return Err(CatalogError::Invalid("no colors".to_string()));
        }
        for synonym in &self.item_synonyms {
            if self.category(&synonym.canonical).is_none() {
                return Err(CatalogError::Invalid(format!(
                    "item synonym '{}' points at unknown item '{}'",
                    synonym.term, synonym.canonical
                )));
            }
        }
        for synonym in &self.color_synonyms {
            if self.color(&synonym.canonical).is_none() {
                return Err(CatalogError::Invalid(format!(
                    "color synonym '{}' points at unknown color '{}'",
                    synonym.term, synonym.canonical
                )));
            }
        }
        Ok(())
    }

    /// Look up a category by its key, ignoring spelling variants
    pub fn category(&self, key: &str) -> Option<&FurnitureCategory> {
        let wanted = normalize(key);
        self.furniture
            .iter()
            .find(|c| normalize(&c.key) == wanted)
    }

    fn color(&self, name: &str) -> Option<&ColorEntry> {
        let wanted = normalize(name);
        self.colors
            .iter()
            .find(|c| normalize(&c.name) == wanted)
    }

    /// First furniture item mentioned in a normalized utterance.
    ///
    /// Category keys are checked before the synonym list; within each pass
    /// the first match in catalog order wins.
    pub fn detect_item(&self, normalized: &str) -> Option<&FurnitureCategory> {
        self.furniture
            .iter()
            .find(|c| contains_term(normalized, &c.key))
            .or_else(|| {
                self.item_synonyms
                    .iter()
                    .find(|s| contains_term(normalized, &s.term))
                    .and_then(|s| self.category(&s.canonical))
            })
    }

    /// First color mentioned in a normalized utterance, same ordering rules
    /// as [`Catalog::detect_item`].
    pub fn detect_color(&self, normalized: &str) -> Option<&ColorEntry> {
        self.colors
            .iter()
            .find(|c| contains_term(normalized, &c.name))
            .or_else(|| {
                self.color_synonyms
                    .iter()
                    .find(|s| contains_term(normalized, &s.term))
                    .and_then(|s| self.color(&s.canonical))
            })
    }

    pub fn first_model(&self, item: &str) -> Option<&FurnitureModel> {
        self.category(item).and_then(|c| c.models.first())
    }

    /// Colors of the item's first model, verbatim and in catalog order
    pub fn first_model_colors(&self, item: &str) -> &[String] {
        self.first_model(item)
            .map(|m| m.colors.as_slice())
            .unwrap_or_default()
    }

    /// Union of colors across all models of an item, first occurrence order
    pub fn colors_for(&self, item: &str) -> Vec<&str> {
        self.category(item)
            .map(|c| dedup(c.models.iter().flat_map(|m| m.colors.iter())))
            .unwrap_or_default()
    }

    /// Whether any model of the item comes in the color
    pub fn offers_color(&self, item: &str, color: &str) -> bool {
        let wanted = normalize(color);
        self.colors_for(item)
            .into_iter()
            .any(|c| normalize(c) == wanted)
    }

    /// Union of materials across all models of an item, first occurrence order
    pub fn materials_for(&self, item: &str) -> Vec<&str> {
        self.category(item)
            .map(|c| dedup(c.models.iter().flat_map(|m| m.materials.iter())))
            .unwrap_or_default()
    }

    /// Display label for an item in the given language
    pub fn item_label<'a>(&'a self, item: &'a str, language: Language) -> &'a str {
        match language {
            Language::Arabic => item,
            Language::English => self
                .category(item)
                .and_then(|c| c.english.as_deref())
                .unwrap_or(item),
        }
    }

    /// Display label for a color in the given language
    pub fn color_label<'a>(&'a self, color: &'a str, language: Language) -> &'a str {
        match language {
            Language::Arabic => color,
            Language::English => self
                .color(color)
                .and_then(|c| c.english.as_deref())
                .unwrap_or(color),
        }
    }

    /// Display label for a material in the given language
    pub fn material_label<'a>(&'a self, material: &'a str, language: Language) -> &'a str {
        match language {
            Language::Arabic => material,
            Language::English => {
                let wanted = normalize(material);
                self.materials
                    .iter()
                    .find(|m| normalize(&m.name) == wanted)
                    .and_then(|m| m.english.as_deref())
                    .unwrap_or(material)
            }
        }
    }
}

fn dedup<'a>(values: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for value in values {
        if !seen.contains(&value.as_str()) {
            seen.push(value.as_str());
        }
    }
    seen
}
