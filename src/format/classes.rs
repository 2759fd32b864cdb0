//! Class-name files.
//!
//! Two layouts are understood:
//! - mapping files (`.yaml`, `.yml`, `.json`) with a `names` list or
//!   `id: name` map and an `nc` count
//! - anything else is plain text, one name per line, id = line number

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::format::error::FormatError;
use crate::model::ClassNames;

#[derive(Deserialize)]
struct NamesFile {
    names: NamesField,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamesField {
    List(Vec<String>),
    Map(BTreeMap<ClassKey, String>),
}

/// Map keys are integers in YAML but strings in JSON.
#[derive(Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(untagged)]
enum ClassKey {
    Id(u32),
    Text(String),
}

impl ClassKey {
    fn id(&self) -> Option<u32> {
        match self {
            ClassKey::Id(id) => Some(*id),
            ClassKey::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl TryFrom<NamesField> for ClassNames {
    type Error = FormatError;

    fn try_from(field: NamesField) -> Result<Self, FormatError> {
        match field {
            NamesField::List(names) => Ok(ClassNames::from_list(names)),
            NamesField::Map(map) => {
                let mut names = ClassNames::new();
                for (key, name) in map {
                    let id = key.id().ok_or_else(|| {
                        FormatError::invalid_format(format!(
                            "class {:?} has a non-numeric id",
                            name
                        ))
                    })?;
                    names.insert(id, name);
                }
                Ok(names)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Yaml,
    Json,
    Text,
}

fn layout_of(path: &Path) -> Layout {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("yaml" | "yml") => Layout::Yaml,
        Some("json") => Layout::Json,
        _ => Layout::Text,
    }
}

/// Parse plain text, one name per line. Blank lines keep their index.
pub fn parse_text(content: &str) -> ClassNames {
    let mut names = ClassNames::new();
    for (idx, line) in content.lines().enumerate() {
        let name = line.trim();
        if !name.is_empty() {
            names.insert(idx as u32, name);
        }
    }
    names
}

pub fn parse_yaml(content: &str) -> Result<ClassNames, FormatError> {
    let file: NamesFile = serde_yaml::from_str(content)?;
    file.names.try_into()
}

pub fn parse_json(content: &str) -> Result<ClassNames, FormatError> {
    let file: NamesFile = serde_json::from_str(content)?;
    file.names.try_into()
}

/// Load class names, choosing the layout from the file extension.
pub fn load(path: &Path) -> Result<ClassNames, FormatError> {
    let content = std::fs::read_to_string(path)?;
    let names = match layout_of(path) {
        Layout::Yaml => parse_yaml(&content)?,
        Layout::Json => parse_json(&content)?,
        Layout::Text => parse_text(&content),
    };
    log::info!("Loaded {} class names from {:?}", names.len(), path);
    Ok(names)
}

/// Save class names as a dense `0..=max` list.
///
/// Mapping files keep any other top-level keys already present in `path`.
pub fn save(path: &Path, names: &ClassNames) -> Result<(), FormatError> {
    if names.is_empty() {
        return Err(FormatError::EmptyClassNames);
    }
    let dense = names.dense_names();

    let content = match layout_of(path) {
        Layout::Yaml => {
            let mut root = match std::fs::read_to_string(path) {
                Ok(existing) => match serde_yaml::from_str(&existing) {
                    Ok(serde_yaml::Value::Mapping(map)) => map,
                    _ => serde_yaml::Mapping::new(),
                },
                Err(_) => serde_yaml::Mapping::new(),
            };
            root.insert("names".into(), serde_yaml::to_value(&dense)?);
            root.insert("nc".into(), serde_yaml::to_value(dense.len())?);
            serde_yaml::to_string(&root)?
        }
        Layout::Json => {
            let mut root = match std::fs::read_to_string(path) {
                Ok(existing) => match serde_json::from_str(&existing) {
                    Ok(serde_json::Value::Object(map)) => map,
                    _ => serde_json::Map::new(),
                },
                Err(_) => serde_json::Map::new(),
            };
            root.insert("names".into(), serde_json::to_value(&dense)?);
            root.insert("nc".into(), dense.len().into());
            serde_json::to_string_pretty(&root)?
        }
        Layout::Text => dense.iter().map(|n| format!("{}\n", n)).collect(),
    };

    std::fs::write(path, content)?;
    log::info!("Saved {} class names to {:?}", dense.len(), path);
    Ok(())
}
